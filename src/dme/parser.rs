//! Configuration block parsing.
//!
//! Turns device-native CLI text into the ordered command list that is sent to
//! the device for validation. Blank lines and `!` comments are dropped, trailing
//! whitespace is trimmed and indentation is kept, since NX-OS uses it to nest
//! sub-mode commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comment marker for NX-OS configuration text
pub const COMMENT_MARKER: char = '!';

/// One non-empty, non-comment command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConfigLine(String);

impl ConfigLine {
    /// Build a command line from raw text, or `None` if the line is blank or a
    /// comment.
    pub fn new(raw: &str) -> Option<Self> {
        let line = raw.trim_end();
        if line.is_empty() || line.trim_start().starts_with(COMMENT_MARKER) {
            None
        } else {
            Some(Self(line.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ConfigLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a configuration block into command lines.
///
/// `None` and `""` both yield an empty list.
pub fn parse_config_block(text: Option<&str>) -> Vec<ConfigLine> {
    text.map(|t| t.split('\n').filter_map(ConfigLine::new).collect())
        .unwrap_or_default()
}

/// Configuration input split the way playbooks usually provide it.
///
/// Groups are concatenated in the order `before`, `parents`, `lines`, `after`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSections {
    pub before: Vec<String>,
    pub parents: Vec<String>,
    pub lines: Vec<String>,
    pub after: Vec<String>,
}

impl ConfigSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before(mut self, before: Vec<String>) -> Self {
        self.before = before;
        self
    }

    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    pub fn with_lines(mut self, lines: Vec<String>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_after(mut self, after: Vec<String>) -> Self {
        self.after = after;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.parents.is_empty()
            && self.lines.is_empty()
            && self.after.is_empty()
    }

    /// Join every group into one newline-separated block.
    pub fn assemble(&self) -> String {
        self.before
            .iter()
            .chain(&self.parents)
            .chain(&self.lines)
            .chain(&self.after)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Assemble and parse in one step.
    pub fn to_config_lines(&self) -> Vec<ConfigLine> {
        parse_config_block(Some(&self.assemble()))
    }
}
