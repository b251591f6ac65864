//! Caller identity
//!
//! Attributes bound to the caller's credential, read through an injected
//! provider.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

/// Read-only access to the current caller's credential attributes
pub trait IdentityProvider {
    /// Value of attribute `name`; fails when the credential doesn't carry it
    fn read_attribute(&self, name: &str) -> Result<String>;
}

/// Fixed attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    attributes: HashMap<String, String>,
}

impl StaticIdentity {
    /// An identity with no attributes
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Add or replace an attribute
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl IdentityProvider for StaticIdentity {
    fn read_attribute(&self, name: &str) -> Result<String> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerError::Auth(format!("attribute '{}' is not bound to the caller", name)))
    }
}

/// One `name=value` attribute, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl FromStr for Attribute {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok(Self {
                name: name.to_string(),
                value: value.to_string(),
            }),
            _ => Err(LedgerError::Config(format!(
                "attribute '{}' is not of the form name=value",
                s
            ))),
        }
    }
}

impl FromIterator<Attribute> for StaticIdentity {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::anonymous(), |id, attr| id.with(attr.name, attr.value))
    }
}
