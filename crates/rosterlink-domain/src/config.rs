//! Configuration structures
//!
//! Pure data; resolution from environment variables and files lives in
//! the infra crate. The base config directory is an explicit value
//! threaded through constructors rather than process-wide mutable state,
//! so tests can point components at a temp directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Process-wide settings, resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base directory for conventional per-service credential files.
    /// Its internal layout is owned by the credential sources.
    pub config_dir: PathBuf,

    /// Backend endpoints, overridable for tests and non-production
    /// deployments.
    #[serde(default)]
    pub endpoints: ServiceEndpoints,
}

impl Settings {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into(), endpoints: ServiceEndpoints::default() }
    }
}

/// Base URLs for the integrated backends.
///
/// The mailing-list host is intentionally absent: the survey platform's
/// host is part of its credential (`data_center`), not of static
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    /// Workgroup directory REST API root.
    pub workgroup_base_url: String,
    /// Profile registry API root.
    pub profiles_base_url: String,
    /// OAuth token endpoint of the profile registry's authorization
    /// server.
    pub profiles_token_url: String,
    /// Cloud identity provider authorization endpoint (interactive flow).
    pub google_auth_url: String,
    /// Cloud identity provider token endpoint (interactive flow).
    pub google_token_url: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            workgroup_base_url: "https://workgroupsvc.example.edu/workgroups/2.0".to_string(),
            profiles_base_url: "https://profiles.example.edu/api".to_string(),
            profiles_token_url: "https://authz.example.edu/oauth/token".to_string(),
            google_auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            google_token_url: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_defaults_for_endpoints() {
        let settings = Settings::new("/tmp/rosterlink-test");
        assert!(settings.endpoints.workgroup_base_url.starts_with("https://"));
        assert_eq!(settings.config_dir, PathBuf::from("/tmp/rosterlink-test"));
    }

    #[test]
    fn endpoints_deserialize_with_partial_override() {
        let toml = r#"workgroup_base_url = "http://127.0.0.1:9000""#;
        let endpoints: ServiceEndpoints = toml::from_str(toml).expect("parse");
        assert_eq!(endpoints.workgroup_base_url, "http://127.0.0.1:9000");
        // Unspecified fields keep their defaults.
        assert!(endpoints.profiles_base_url.contains("example.edu"));
    }
}
