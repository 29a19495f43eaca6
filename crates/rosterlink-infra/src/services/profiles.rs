//! Profile registry client
//!
//! Read-only: the registry is the institutional system of record, so
//! membership mutations through this client are refused up front with
//! `Unsupported`, before any request leaves the process. Listing pages
//! through the registry filtered by an organization code; `lookup`
//! returns a single person's profile.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rosterlink_core::MemberService;
use rosterlink_domain::{
    Credential, CredentialMaterial, MemberOutcome, MemberSet, Result, RosterError, Secret,
    ServiceEndpoints, ServiceKind, Uid,
};
use serde::Deserialize;

use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::services::status_error;

pub struct ProfileClient {
    http: HttpClient,
    base_url: String,
    org_code: String,
    bearer: Secret,
}

/// One person's registry entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub uid: String,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub position: Option<String>,
    pub organization: Option<String>,
}

#[derive(Deserialize)]
struct ProfilePage {
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(rename = "totalPages", default)]
    total_pages: u32,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ProfileClient {
    /// Build a client from a resolved OAuth client-credentials pair,
    /// exchanging it for a bearer token at the registry's authorization
    /// server.
    ///
    /// # Errors
    /// `RosterError::Config` for unusable credential material; transport
    /// errors from the token exchange.
    pub async fn connect(
        credential: &Credential,
        endpoints: &ServiceEndpoints,
        org_code: impl Into<String>,
    ) -> Result<Self> {
        let CredentialMaterial::OAuthClient { client_id, client_secret, .. } =
            &credential.material
        else {
            return Err(RosterError::Config(
                "profile client requires an OAuth client-credentials pair".into(),
            ));
        };

        let http = HttpClient::new()?;
        let params = [("grant_type", "client_credentials")];
        let response = http
            .send(
                http.request(Method::POST, &endpoints.profiles_token_url)
                    .basic_auth(client_id, Some(client_secret.expose()))
                    .form(&params),
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(ServiceKind::Profiles, status, "token exchange"));
        }

        let body: TokenResponse = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            RosterError::from(infra)
        })?;

        Ok(Self::with_http(
            http,
            endpoints.profiles_base_url.clone(),
            body.access_token,
            org_code,
        ))
    }

    /// Build a client over an existing transport with a ready bearer
    /// token, for tests and non-production endpoints.
    pub fn with_http(
        http: HttpClient,
        base_url: impl Into<String>,
        bearer: impl Into<String>,
        org_code: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            org_code: org_code.into(),
            bearer: Secret::new(bearer.into()),
        }
    }

    /// Fetch one person's profile by identifier.
    ///
    /// # Errors
    /// `RosterError::NotFound` for unknown identifiers.
    pub async fn lookup(&self, uid: &Uid) -> Result<Profile> {
        let url = format!("{}/profiles/{}", self.base_url, uid.as_str());
        let response = self
            .http
            .send(self.http.request(Method::GET, url).bearer_auth(self.bearer.expose()))
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RosterError::NotFound(format!("no profile for '{uid}'")));
        }
        if !status.is_success() {
            return Err(status_error(ServiceKind::Profiles, status, "profile lookup"));
        }

        response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            RosterError::from(infra)
        })
    }
}

#[async_trait]
impl MemberService for ProfileClient {
    fn label(&self) -> String {
        format!("profiles:{}", self.org_code)
    }

    async fn list_members(&self) -> Result<MemberSet> {
        let mut members = MemberSet::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/profiles?organization={}&page={}",
                self.base_url, self.org_code, page
            );
            let response = self
                .http
                .send(self.http.request(Method::GET, url).bearer_auth(self.bearer.expose()))
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(ServiceKind::Profiles, status, "list profiles"));
            }

            let body: ProfilePage = response.json().await.map_err(|err| {
                let infra: InfraError = err.into();
                RosterError::from(infra)
            })?;

            members = members
                .union(&body.profiles.iter().filter_map(|p| Uid::new(&p.uid)).collect());

            if page >= body.total_pages {
                break;
            }
            page += 1;
        }

        Ok(members)
    }

    async fn add_members(&self, _uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        Err(RosterError::Unsupported {
            service: ServiceKind::Profiles,
            operation: "adding members".into(),
        })
    }

    async fn remove_members(&self, _uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        Err(RosterError::Unsupported {
            service: ServiceKind::Profiles,
            operation: "removing members".into(),
        })
    }
}
