//! Authorization Module
//!
//! Mutations of rows owned by a participant are allowed only when the
//! caller's identity attribute (its bank id) matches the owner. The gate can
//! be switched off at runtime through `Config::check_permissions`.

mod gate;
mod identity;

pub use gate::AuthGate;
pub use identity::{Attribute, IdentityProvider, StaticIdentity};
