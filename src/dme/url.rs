//! DME REST addressing.
//!
//! The DME object model is reached either by class (every managed object of a
//! class) or by distinguished name (one managed object and optionally its
//! subtree). Query parameters are appended in a fixed order and only when set:
//!
//! ```text
//! /api/node/class/{class}.json[?rsp-prop-include=..]
//! /api/mo/{dn}.json[?rsp-prop-include=..][&rsp-subtree=..][&query-target=..][&target-subtree-class=..]
//! ```
//!
//! The first parameter present is introduced with `?`, every later one with `&`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Prefix for class queries
pub const CLASS_PREFIX: &str = "/api/node/class/";

/// Prefix for managed-object queries
pub const MO_PREFIX: &str = "/api/mo/";

/// Suffix selecting the JSON representation
pub const JSON_SUFFIX: &str = ".json";

/// Characters that stay verbatim in DNs and query values. DNs such as
/// `sys/intf/phys-[eth1/1]` and class lists such as `l1PhysIf,ethpmPhysIf`
/// must reach the device unchanged.
fn is_verbatim(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '_' | '.' | '~' | '/' | '[' | ']' | ':' | '@' | ',')
}

/// Percent-encode every character outside the verbatim set.
pub fn escape_component(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_verbatim) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if is_verbatim(c) {
            escaped.push(c);
        } else {
            escaped.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Cow::Owned(escaped)
}

fn require_entry(entry: &str) -> Result<&str> {
    if entry.trim().is_empty() {
        Err(Error::precondition("a class name or distinguished name is required"))
    } else {
        Ok(entry)
    }
}

/// Append `key=value` pairs whose value is present and non-empty.
fn append_query(url: &mut String, params: &[(&str, Option<&str>)]) {
    let mut separator = '?';
    for (key, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            url.push(separator);
            url.push_str(key);
            url.push('=');
            url.push_str(&escape_component(value));
            separator = '&';
        }
    }
}

/// Build the path of a class query.
pub fn build_class_url(entry: &str, rsp_prop_include: Option<&str>) -> Result<String> {
    let entry = require_entry(entry)?;
    let mut url = format!("{}{}{}", CLASS_PREFIX, escape_component(entry), JSON_SUFFIX);
    append_query(&mut url, &[("rsp-prop-include", rsp_prop_include)]);
    Ok(url)
}

/// Build the path of a managed-object query.
pub fn build_mo_url(
    entry: &str,
    rsp_prop_include: Option<&str>,
    rsp_subtree: Option<&str>,
    query_target: Option<&str>,
    target_subtree_class: Option<&str>,
) -> Result<String> {
    let entry = require_entry(entry)?;
    let mut url = format!("{}{}{}", MO_PREFIX, escape_component(entry), JSON_SUFFIX);
    append_query(
        &mut url,
        &[
            ("rsp-prop-include", rsp_prop_include),
            ("rsp-subtree", rsp_subtree),
            ("query-target", query_target),
            ("target-subtree-class", target_subtree_class),
        ],
    );
    Ok(url)
}

/// Class query: every managed object of one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassQuery {
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsp_prop_include: Option<String>,
}

impl ClassQuery {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            rsp_prop_include: None,
        }
    }

    pub fn with_rsp_prop_include(mut self, value: impl Into<String>) -> Self {
        self.rsp_prop_include = Some(value.into());
        self
    }
}

/// Managed-object query by distinguished name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoQuery {
    pub dn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsp_prop_include: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsp_subtree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_subtree_class: Option<String>,
}

impl MoQuery {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Self::default()
        }
    }

    pub fn with_rsp_prop_include(mut self, value: impl Into<String>) -> Self {
        self.rsp_prop_include = Some(value.into());
        self
    }

    pub fn with_rsp_subtree(mut self, value: impl Into<String>) -> Self {
        self.rsp_subtree = Some(value.into());
        self
    }

    pub fn with_query_target(mut self, value: impl Into<String>) -> Self {
        self.query_target = Some(value.into());
        self
    }

    pub fn with_target_subtree_class(mut self, value: impl Into<String>) -> Self {
        self.target_subtree_class = Some(value.into());
        self
    }
}

/// Where a read request points in the DME object model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DmeAddress {
    Class(ClassQuery),
    Mo(MoQuery),
}

impl DmeAddress {
    pub fn class(class_name: impl Into<String>) -> Self {
        DmeAddress::Class(ClassQuery::new(class_name))
    }

    pub fn mo(dn: impl Into<String>) -> Self {
        DmeAddress::Mo(MoQuery::new(dn))
    }

    /// Request path, including the query string.
    pub fn to_path(&self) -> Result<String> {
        match self {
            DmeAddress::Class(q) => build_class_url(&q.class_name, q.rsp_prop_include.as_deref()),
            DmeAddress::Mo(q) => build_mo_url(
                &q.dn,
                q.rsp_prop_include.as_deref(),
                q.rsp_subtree.as_deref(),
                q.query_target.as_deref(),
                q.target_subtree_class.as_deref(),
            ),
        }
    }
}

impl From<ClassQuery> for DmeAddress {
    fn from(query: ClassQuery) -> Self {
        DmeAddress::Class(query)
    }
}

impl From<MoQuery> for DmeAddress {
    fn from(query: MoQuery) -> Self {
        DmeAddress::Mo(query)
    }
}
