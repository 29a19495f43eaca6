//! Concrete credential sources
//!
//! Implementations of the `CredentialSource` step protocol, in the order
//! the default chain wires them:
//!
//! 1. [`EnvPathSource`] — environment variables naming credential files
//! 2. [`EnvContentSource`] — environment variables carrying credential
//!    content directly
//! 3. [`ConfigFileSource`] — conventional per-service files under the
//!    base config directory
//! 4. [`ManagedContextSource`] — ambient identity of a managed runtime
//! 5. [`InteractiveSource`] — browser consent flow, only when one is
//!    wired

mod env;
mod file;
mod interactive;
mod managed;

use rosterlink_core::CredentialStore;
use rosterlink_domain::{CredentialMaterial, Secret, Settings};

pub use env::{EnvContentSource, EnvPathSource};
pub use file::ConfigFileSource;
pub use interactive::{
    build_authorization_url, exchange_code, ConsentFlow, ConsentRequest, InteractiveSource,
    PkceChallenge, TokenSet,
};
pub use managed::ManagedContextSource;

/// The default resolution chain for non-interactive processes.
#[must_use]
pub fn default_store(settings: &Settings) -> CredentialStore {
    CredentialStore::new(vec![
        Box::new(EnvPathSource),
        Box::new(EnvContentSource),
        Box::new(ConfigFileSource::new(&settings.config_dir)),
        Box::new(ManagedContextSource),
    ])
}

/// The default chain with an interactive consent flow appended, for
/// processes with a user in front of them.
#[must_use]
pub fn default_store_with_consent(
    settings: &Settings,
    flow: Box<dyn ConsentFlow>,
) -> CredentialStore {
    CredentialStore::new(vec![
        Box::new(EnvPathSource),
        Box::new(EnvContentSource),
        Box::new(ConfigFileSource::new(&settings.config_dir)),
        Box::new(ManagedContextSource),
        Box::new(InteractiveSource::new(flow)),
    ])
}

/// Parse the mailing-list credential JSON.
///
/// Requires `data_center` plus either `api_token` or both `client_id`
/// and `client_secret`. Anything else is a malformed credential, not a
/// missing one.
pub(crate) fn parse_mailinglist_json(raw: &str) -> Result<CredentialMaterial, String> {
    #[derive(serde::Deserialize)]
    struct MailingListAuth {
        data_center: String,
        api_token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    }

    let parsed: MailingListAuth =
        serde_json::from_str(raw).map_err(|e| format!("mailing-list auth is not valid JSON: {e}"))?;

    if parsed.data_center.trim().is_empty() {
        return Err("mailing-list auth is missing 'data_center'".into());
    }

    if let Some(token) = parsed.api_token {
        return Ok(CredentialMaterial::ApiToken {
            host: parsed.data_center,
            token: Secret::new(token),
        });
    }

    match (parsed.client_id, parsed.client_secret) {
        (Some(id), Some(secret)) => Ok(CredentialMaterial::OAuthClient {
            host: Some(parsed.data_center),
            client_id: id,
            client_secret: Secret::new(secret),
        }),
        _ => Err(
            "mailing-list auth needs 'api_token' or both 'client_id' and 'client_secret'".into(),
        ),
    }
}

/// Parse the profile-registry credential JSON: `client_id` and
/// `client_secret` are both required.
pub(crate) fn parse_profiles_json(raw: &str) -> Result<CredentialMaterial, String> {
    #[derive(serde::Deserialize)]
    struct ProfilesAuth {
        client_id: String,
        client_secret: String,
    }

    let parsed: ProfilesAuth =
        serde_json::from_str(raw).map_err(|e| format!("profiles auth is not valid JSON: {e}"))?;

    if parsed.client_id.trim().is_empty() || parsed.client_secret.trim().is_empty() {
        return Err("profiles auth has empty 'client_id' or 'client_secret'".into());
    }

    Ok(CredentialMaterial::OAuthClient {
        host: None,
        client_id: parsed.client_id,
        client_secret: Secret::new(parsed.client_secret),
    })
}

/// Validate a cloud service-account key: must be a JSON object carrying
/// `"type": "service_account"`.
pub(crate) fn parse_google_key(raw: &str) -> Result<CredentialMaterial, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("service-account key is not valid JSON: {e}"))?;

    match value.get("type").and_then(|t| t.as_str()) {
        Some("service_account") => Ok(CredentialMaterial::ServiceAccountKey {
            key: Secret::new(raw.to_string()),
        }),
        Some(other) => Err(format!("unexpected key type '{other}', wanted 'service_account'")),
        None => Err("service-account key is missing 'type'".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailinglist_json_with_api_token() {
        let material = parse_mailinglist_json(
            r#"{"data_center": "dc1.example.com", "api_token": "tok"}"#,
        )
        .expect("parse");
        assert!(matches!(material, CredentialMaterial::ApiToken { ref host, .. } if host == "dc1.example.com"));
    }

    #[test]
    fn mailinglist_json_with_oauth_pair() {
        let material = parse_mailinglist_json(
            r#"{"data_center": "dc1.example.com", "client_id": "cid", "client_secret": "cs"}"#,
        )
        .expect("parse");
        assert!(matches!(material, CredentialMaterial::OAuthClient { .. }));
    }

    #[test]
    fn mailinglist_json_without_data_center_is_rejected() {
        let err = parse_mailinglist_json(r#"{"api_token": "tok"}"#).unwrap_err();
        assert!(err.contains("JSON") || err.contains("data_center"));
    }

    #[test]
    fn mailinglist_json_with_half_an_oauth_pair_is_rejected() {
        let err = parse_mailinglist_json(
            r#"{"data_center": "dc1.example.com", "client_id": "cid"}"#,
        )
        .unwrap_err();
        assert!(err.contains("client_secret"));
    }

    #[test]
    fn google_key_requires_service_account_type() {
        assert!(parse_google_key(r#"{"type": "service_account", "project_id": "p"}"#).is_ok());
        assert!(parse_google_key(r#"{"type": "authorized_user"}"#).is_err());
        assert!(parse_google_key(r#"{"project_id": "p"}"#).is_err());
    }
}
