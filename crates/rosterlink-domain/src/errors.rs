//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::credential::{Provenance, ServiceKind};

/// Main error type for Rosterlink
///
/// Credential errors are terminal: no service call is attempted without
/// valid credentials. Partial batch failures are *not* represented here;
/// they travel as data in a [`crate::types::sync::SyncReport`] so callers
/// can inspect per-UID outcomes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum RosterError {
    /// Every credential source for the service was absent.
    #[error("no credentials found for service '{service}'")]
    CredentialNotFound { service: ServiceKind },

    /// A credential source was present but malformed or unreadable.
    /// Explicit configuration implies user intent, so this aborts
    /// resolution instead of falling through to the next source.
    #[error("invalid credentials from {provenance} for service '{service}': {reason}")]
    CredentialInvalid { service: ServiceKind, provenance: Provenance, reason: String },

    /// A mutating call against a read-only backend.
    #[error("service '{service}' does not support {operation}")]
    Unsupported { service: ServiceKind, operation: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Rosterlink operations
pub type Result<T> = std::result::Result<T, RosterError>;
