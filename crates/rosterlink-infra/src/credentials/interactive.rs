//! Interactive consent credential source
//!
//! Last step of the chain: when a user is present, obtain a token set
//! through a browser OAuth 2.0 authorization-code flow with PKCE
//! (RFC 7636). The [`ConsentFlow`] trait hides the browser/redirect
//! mechanics; this module supplies the building blocks a flow needs —
//! verifier/challenge/state generation, authorization URL construction,
//! and the code-for-token exchange.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reqwest::Method;
use rosterlink_core::{CredentialSource, Probe};
use rosterlink_domain::{
    Credential, CredentialMaterial, Provenance, Result, Secret, ServiceKind,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// PKCE verifier/challenge pair plus CSRF state.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Random string, base64url, kept secret until token exchange.
    pub code_verifier: String,
    /// SHA256 hash of the verifier, base64url, sent in the authorization
    /// request.
    pub code_challenge: String,
    /// Random CSRF token; must round-trip through the callback.
    pub state: String,
}

impl PkceChallenge {
    /// Generate fresh random values. 32 random bytes encode to 43
    /// characters, inside the 43-128 range RFC 7636 requires.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = random_token();
        let code_challenge = challenge_for(&code_verifier);
        Self { code_verifier, code_challenge, state: random_token() }
    }

    /// Challenge method sent alongside the challenge, always `S256`.
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn challenge_for(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Build the browser authorization URL for a PKCE flow.
///
/// # Errors
/// Returns `RosterError::Config` when `auth_url` is not a valid URL.
pub fn build_authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
    pkce: &PkceChallenge,
) -> Result<Url> {
    let mut url = Url::parse(auth_url).map_err(|e| {
        rosterlink_domain::RosterError::Config(format!("invalid authorization URL: {e}"))
    })?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", &pkce.state)
        .append_pair("code_challenge", &pkce.code_challenge)
        .append_pair("code_challenge_method", pkce.challenge_method());

    Ok(url)
}

/// Token set returned by the authorization server.
#[derive(Debug)]
pub struct TokenSet {
    pub access_token: Secret,
    pub refresh_token: Option<Secret>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<TokenSet> for CredentialMaterial {
    fn from(tokens: TokenSet) -> Self {
        CredentialMaterial::UserToken {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
        }
    }
}

/// Exchange an authorization code for a token set.
///
/// # Errors
/// Propagates transport failures and non-success token endpoint
/// responses as domain errors.
pub async fn exchange_code(
    http: &HttpClient,
    token_url: &str,
    client_id: &str,
    redirect_uri: &str,
    code: &str,
    code_verifier: &str,
) -> Result<TokenSet> {
    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
    }

    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("code_verifier", code_verifier),
    ];

    let response = http.send(http.request(Method::POST, token_url).form(&params)).await?;
    let response = response.error_for_status().map_err(|err| {
        let infra: InfraError = err.into();
        rosterlink_domain::RosterError::from(infra)
    })?;

    let body: TokenResponse = response.json().await.map_err(|err| {
        let infra: InfraError = err.into();
        rosterlink_domain::RosterError::from(infra)
    })?;

    Ok(TokenSet {
        access_token: Secret::new(body.access_token),
        refresh_token: body.refresh_token.map(Secret::new),
        expires_at: body.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

/// Everything a consent flow needs to hand to the browser and back.
#[derive(Debug)]
pub struct ConsentRequest {
    pub authorization_url: Url,
    pub pkce: PkceChallenge,
}

impl ConsentRequest {
    /// Generate a fresh PKCE challenge and the authorization URL that
    /// carries it.
    ///
    /// # Errors
    /// Returns `RosterError::Config` when `auth_url` is not a valid URL.
    pub fn new(
        auth_url: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[&str],
    ) -> Result<Self> {
        let pkce = PkceChallenge::generate();
        let authorization_url =
            build_authorization_url(auth_url, client_id, redirect_uri, scopes, &pkce)?;
        Ok(Self { authorization_url, pkce })
    }
}

/// Drives the user-facing half of the consent dance.
///
/// Implementations open the browser, collect the redirect, validate the
/// returned state against the request's, and run [`exchange_code`].
/// `Ok(None)` means no user is reachable (headless process, declined
/// consent) and resolution moves on; an `Err` is a misbehaving flow and
/// aborts resolution.
pub trait ConsentFlow: Send + Sync {
    fn obtain(&self) -> std::result::Result<Option<TokenSet>, String>;
}

/// Interactive consent as a chain step. Only the cloud identity provider
/// supports it.
pub struct InteractiveSource {
    flow: Box<dyn ConsentFlow>,
}

impl InteractiveSource {
    pub fn new(flow: Box<dyn ConsentFlow>) -> Self {
        Self { flow }
    }
}

impl CredentialSource for InteractiveSource {
    fn provenance(&self) -> Provenance {
        Provenance::Interactive
    }

    fn probe(&self, service: ServiceKind) -> Probe {
        if service != ServiceKind::Google {
            return Probe::Absent;
        }

        match self.flow.obtain() {
            Ok(Some(tokens)) => Probe::Found(Credential::new(
                ServiceKind::Google,
                Provenance::Interactive,
                tokens.into(),
            )),
            Ok(None) => Probe::Absent,
            Err(reason) => Probe::Invalid(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn verifier_and_state_are_within_rfc_limits_and_urlsafe() {
        let pkce = PkceChallenge::generate();

        assert!(pkce.code_verifier.len() >= 43 && pkce.code_verifier.len() <= 128);
        for value in [&pkce.code_verifier, &pkce.code_challenge, &pkce.state] {
            assert!(!value.contains('='));
            assert!(!value.contains('+'));
            assert!(!value.contains('/'));
        }
    }

    #[test]
    fn challenge_is_deterministic_for_a_verifier() {
        let pkce = PkceChallenge::generate();
        assert_eq!(pkce.code_challenge, challenge_for(&pkce.code_verifier));
    }

    #[test]
    fn consecutive_challenges_are_unique() {
        let a = PkceChallenge::generate();
        let b = PkceChallenge::generate();
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn authorization_url_carries_pkce_parameters() {
        let request = ConsentRequest::new(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "client-123",
            "http://127.0.0.1:8123/callback",
            &["openid", "email"],
        )
        .expect("request");

        let query: Vec<(String, String)> = request
            .authorization_url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("code_challenge_method".into(), "S256".into())));
        assert!(query.contains(&("code_challenge".into(), request.pkce.code_challenge.clone())));
        assert!(query.contains(&("state".into(), request.pkce.state.clone())));
        assert!(query.contains(&("scope".into(), "openid email".into())));
    }

    #[tokio::test]
    async fn code_exchange_posts_verifier_and_parses_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code_verifier=verifier-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-123",
                "refresh_token": "rt-456",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = HttpClient::new().expect("http client");
        let tokens = exchange_code(
            &http,
            &format!("{}/token", server.uri()),
            "client-123",
            "http://127.0.0.1:8123/callback",
            "auth-code",
            "verifier-abc",
        )
        .await
        .expect("exchange");

        assert_eq!(tokens.access_token.expose(), "at-123");
        assert_eq!(tokens.refresh_token.as_ref().map(Secret::expose), Some("rt-456"));
        assert!(tokens.expires_at.is_some());
    }

    #[tokio::test]
    async fn token_endpoint_rejection_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let http = HttpClient::new().expect("http client");
        let err = exchange_code(
            &http,
            &format!("{}/token", server.uri()),
            "client-123",
            "http://127.0.0.1:8123/callback",
            "bad-code",
            "verifier-abc",
        )
        .await
        .expect_err("must fail");

        assert!(matches!(err, rosterlink_domain::RosterError::Auth(_)));
    }

    struct DecliningFlow;
    impl ConsentFlow for DecliningFlow {
        fn obtain(&self) -> std::result::Result<Option<TokenSet>, String> {
            Ok(None)
        }
    }

    #[test]
    fn declined_consent_probes_absent() {
        let source = InteractiveSource::new(Box::new(DecliningFlow));
        assert!(matches!(source.probe(ServiceKind::Google), Probe::Absent));
    }

    #[test]
    fn non_google_services_skip_the_consent_flow() {
        let source = InteractiveSource::new(Box::new(DecliningFlow));
        assert!(matches!(source.probe(ServiceKind::Workgroup), Probe::Absent));
    }
}
