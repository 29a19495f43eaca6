//! Credential bundles and provenance
//!
//! A [`Credential`] is an opaque bundle of authentication material tagged
//! with the service it belongs to and the source it was resolved from.
//! Credentials are resolved once per client instantiation and cached for
//! the lifetime of that client; this crate never persists them.
//!
//! Secret material is wrapped in [`Secret`] so it cannot leak through
//! `Debug` formatting or structured log fields.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The backend a credential authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Internal workgroup directory (mutual-TLS REST API).
    Workgroup,
    /// Survey-platform contact directory.
    MailingList,
    /// Read-only profile registry.
    Profiles,
    /// Cloud identity provider (service accounts, managed identity,
    /// interactive consent).
    Google,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Workgroup => "workgroup",
            Self::MailingList => "mailinglist",
            Self::Profiles => "profiles",
            Self::Google => "google",
        };
        f.write_str(name)
    }
}

/// Where a credential was resolved from.
///
/// Provenance matters for debugging ("why is this process authenticating
/// with *that* key?") and for tests asserting fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Environment variables pointing at credential files on disk.
    EnvPath,
    /// Environment variables carrying the credential content directly.
    EnvContent,
    /// Conventional file under the base config directory.
    ConfigFile,
    /// Derived from a managed execution context (e.g. serverless runtime).
    ManagedContext,
    /// Obtained through an interactive user consent flow.
    Interactive,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnvPath => "env path",
            Self::EnvContent => "env content",
            Self::ConfigFile => "config file",
            Self::ManagedContext => "managed context",
            Self::Interactive => "interactive",
        };
        f.write_str(name)
    }
}

/// A string that refuses to appear in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the underlying value. Call sites should hand the result
    /// straight to the transport layer, never to a logger.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The actual authentication material, by mechanism.
#[derive(Debug, Clone)]
pub enum CredentialMaterial {
    /// Mutual-TLS client certificate and key, as files on disk.
    MutualTls { cert_path: PathBuf, key_path: PathBuf },
    /// Mutual-TLS client certificate and key held in memory (container
    /// deployments without a mounted filesystem).
    MutualTlsPem { cert_pem: Secret, key_pem: Secret },
    /// Static API token, with the vendor host it is valid against.
    ApiToken { host: String, token: Secret },
    /// OAuth client-credentials pair.
    OAuthClient { host: Option<String>, client_id: String, client_secret: Secret },
    /// Cloud service-account key, kept as parsed JSON.
    ServiceAccountKey { key: Secret },
    /// Ambient identity of a managed execution context.
    ManagedIdentity { project: Option<String> },
    /// Token set obtained from an interactive consent flow.
    UserToken {
        access_token: Secret,
        refresh_token: Option<Secret>,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// A resolved credential: material plus service and provenance tags.
#[derive(Debug, Clone)]
pub struct Credential {
    pub service: ServiceKind,
    pub provenance: Provenance,
    pub material: CredentialMaterial,
}

impl Credential {
    pub fn new(service: ServiceKind, provenance: Provenance, material: CredentialMaterial) -> Self {
        Self { service, provenance, material }
    }
}
