//! Authorization Gate
//!
//! Compares a caller attribute with the value a mutation requires.

use crate::config::Config;
use crate::error::{LedgerError, Result};
use super::IdentityProvider;

/// Permission check tying mutation rights to an identity attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGate {
    /// When false every check passes
    enabled: bool,

    /// Attribute holding the caller's bank identifier
    attribute: String,
}

impl AuthGate {
    pub fn new(enabled: bool, attribute: impl Into<String>) -> Self {
        Self {
            enabled,
            attribute: attribute.into(),
        }
    }

    /// Gate configured by `check_permissions` and `identity_attribute`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.check_permissions, config.identity_attribute.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Name of the ownership attribute
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Allow the caller only if its ownership attribute equals `expected`
    ///
    /// `Ok(())` means allowed; denial is always `LedgerError::Auth`.
    pub fn check_row_permissions(
        &self,
        identity: &dyn IdentityProvider,
        expected: &str,
    ) -> Result<()> {
        self.check_attribute(identity, &self.attribute, expected)
    }

    /// Allow the caller only if attribute `name` equals `expected`
    pub fn check_attribute(
        &self,
        identity: &dyn IdentityProvider,
        name: &str,
        expected: &str,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let actual = identity.read_attribute(name).map_err(|e| {
            tracing::warn!(attribute = name, error = %e, "Identity attribute lookup failed");
            LedgerError::Auth(format!("failed reading attribute '{}': {}", name, e))
        })?;

        if actual != expected {
            tracing::warn!(attribute = name, %actual, expected, "Permission denied");
            return Err(LedgerError::Auth(format!(
                "attribute '{}' is '{}', expected '{}'",
                name, actual, expected
            )));
        }

        Ok(())
    }
}
