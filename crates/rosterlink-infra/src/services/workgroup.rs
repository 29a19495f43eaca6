//! Workgroup directory client
//!
//! Talks to the institutional workgroup REST API, authenticated with a
//! mutual-TLS client certificate. A client instance is bound to a single
//! workgroup (`stem:name`). The backend has no batch endpoint: each
//! membership mutation is one PUT or DELETE per UID, which is what makes
//! partial failure a first-class outcome here.
//!
//! The member list is fetched lazily and cached for the lifetime of the
//! client; any successful mutation invalidates the cache instead of
//! patching it.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rosterlink_core::MemberService;
use rosterlink_domain::{
    Credential, CredentialMaterial, MemberOutcome, MemberSet, Outcome, Result, RosterError,
    ServiceEndpoints, ServiceKind, Uid,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::services::status_error;

pub struct WorkgroupClient {
    http: HttpClient,
    base_url: String,
    stem: String,
    name: String,
    cache: Mutex<Option<MemberSet>>,
}

#[derive(Deserialize)]
struct WorkgroupDocument {
    #[serde(default)]
    members: Vec<WorkgroupMember>,
}

#[derive(Deserialize)]
struct WorkgroupMember {
    id: String,
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    name: String,
}

impl WorkgroupClient {
    /// Build a client for one workgroup from a resolved mutual-TLS
    /// credential.
    ///
    /// # Errors
    /// `RosterError::Config` if the credential does not carry mutual-TLS
    /// material or the certificate files cannot be read.
    pub fn new(
        credential: &Credential,
        endpoints: &ServiceEndpoints,
        stem: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let pem = match &credential.material {
            CredentialMaterial::MutualTls { cert_path, key_path } => {
                let mut pem = std::fs::read(cert_path).map_err(|err| {
                    let infra: InfraError = err.into();
                    RosterError::from(infra)
                })?;
                pem.extend(std::fs::read(key_path).map_err(|err| {
                    let infra: InfraError = err.into();
                    RosterError::from(infra)
                })?);
                pem
            }
            CredentialMaterial::MutualTlsPem { cert_pem, key_pem } => {
                let mut pem = cert_pem.expose().as_bytes().to_vec();
                pem.push(b'\n');
                pem.extend(key_pem.expose().as_bytes());
                pem
            }
            _ => {
                return Err(RosterError::Config(format!(
                    "workgroup client requires mutual-TLS credentials (resolved from {})",
                    credential.provenance
                )));
            }
        };

        let identity = reqwest::Identity::from_pem(&pem).map_err(|err| {
            let infra: InfraError = err.into();
            RosterError::from(infra)
        })?;

        let http = HttpClient::builder().identity(identity).build()?;
        Ok(Self::with_http(http, endpoints.workgroup_base_url.clone(), stem, name))
    }

    /// Build a client over an existing transport, for tests and
    /// non-production endpoints.
    pub fn with_http(
        http: HttpClient,
        base_url: impl Into<String>,
        stem: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            stem: stem.into(),
            name: name.into(),
            cache: Mutex::new(None),
        }
    }

    fn group_url(&self) -> String {
        format!("{}/workgroups/{}:{}", self.base_url, self.stem, self.name)
    }

    fn member_url(&self, uid: &Uid) -> String {
        format!("{}/members/{}", self.group_url(), uid.as_str())
    }

    async fn fetch_members(&self) -> Result<MemberSet> {
        let response = self.http.send(self.http.request(Method::GET, self.group_url())).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(ServiceKind::Workgroup, status, "fetch workgroup"));
        }

        let document: WorkgroupDocument = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            RosterError::from(infra)
        })?;

        Ok(document.members.iter().filter_map(|m| Uid::new(&m.id)).collect())
    }

    async fn invalidate_cache(&self) {
        *self.cache.lock().await = None;
    }

    /// List the names of workgroups under a stem.
    pub async fn search(&self, stem: &str) -> Result<Vec<String>> {
        let url = format!("{}/workgroups?stem={}", self.base_url, stem);
        let response = self.http.send(self.http.request(Method::GET, url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(ServiceKind::Workgroup, status, "search workgroups"));
        }

        let results: SearchResults = response.json().await.map_err(|err| {
            let infra: InfraError = err.into();
            RosterError::from(infra)
        })?;

        Ok(results.results.into_iter().map(|entry| entry.name).collect())
    }
}

#[async_trait]
impl MemberService for WorkgroupClient {
    fn label(&self) -> String {
        format!("workgroup:{}:{}", self.stem, self.name)
    }

    async fn list_members(&self) -> Result<MemberSet> {
        let mut cache = self.cache.lock().await;
        if let Some(members) = cache.as_ref() {
            return Ok(members.clone());
        }

        let members = self.fetch_members().await?;
        debug!(workgroup = %self.label(), members = members.len(), "fetched workgroup members");
        *cache = Some(members.clone());
        Ok(members)
    }

    async fn add_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        let mut outcomes = Vec::with_capacity(uids.len());
        let mut mutated = false;

        for uid in uids {
            let outcome =
                match self.http.send(self.http.request(Method::PUT, self.member_url(uid))).await {
                    Ok(response) => match response.status() {
                        status if status.is_success() => {
                            mutated = true;
                            Outcome::Applied
                        }
                        StatusCode::CONFLICT => Outcome::AlreadyPresent,
                        status => Outcome::Failed(
                            status_error(ServiceKind::Workgroup, status, "add member").to_string(),
                        ),
                    },
                    Err(err) => Outcome::Failed(err.to_string()),
                };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }

        if mutated {
            self.invalidate_cache().await;
        }
        Ok(outcomes)
    }

    async fn remove_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        let mut outcomes = Vec::with_capacity(uids.len());
        let mut mutated = false;

        for uid in uids {
            let outcome = match self
                .http
                .send(self.http.request(Method::DELETE, self.member_url(uid)))
                .await
            {
                Ok(response) => match response.status() {
                    status if status.is_success() => {
                        mutated = true;
                        Outcome::Applied
                    }
                    StatusCode::NOT_FOUND => Outcome::NotPresent,
                    status => Outcome::Failed(
                        status_error(ServiceKind::Workgroup, status, "remove member").to_string(),
                    ),
                },
                Err(err) => Outcome::Failed(err.to_string()),
            };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }

        if mutated {
            self.invalidate_cache().await;
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> WorkgroupClient {
        let http = HttpClient::builder()
            .max_attempts(1)
            .base_backoff(Duration::from_millis(1))
            .build()
            .expect("http client");
        WorkgroupClient::with_http(http, server.uri(), "research", "lab")
    }

    fn uids(raw: &[&str]) -> MemberSet {
        MemberSet::from_raw(raw.iter().copied())
    }

    #[tokio::test]
    async fn lists_members_from_the_group_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workgroups/research:lab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "research:lab",
                "members": [
                    {"id": "auid", "type": "USER"},
                    {"id": "buid", "type": "USER"},
                ],
            })))
            .mount(&server)
            .await;

        let members = client(&server).list_members().await.expect("list");
        assert_eq!(members, uids(&["auid", "buid"]));
    }

    #[tokio::test]
    async fn member_list_is_cached_until_a_mutation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workgroups/research:lab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "members": [{"id": "auid"}],
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/workgroups/research:lab/members/buid"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client(&server);
        client.list_members().await.expect("first list");
        client.list_members().await.expect("cached list");
        client.add_members(&uids(&["buid"])).await.expect("add");
        client.list_members().await.expect("refetched list");
    }

    #[tokio::test]
    async fn conflict_on_add_is_already_present() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/workgroups/research:lab/members/auid"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let outcomes = client(&server).add_members(&uids(&["auid"])).await.expect("add");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].outcome, Outcome::AlreadyPresent);
    }

    #[tokio::test]
    async fn missing_member_on_remove_is_not_present() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/workgroups/research:lab/members/auid"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcomes = client(&server).remove_members(&uids(&["auid"])).await.expect("remove");
        assert_eq!(outcomes[0].outcome, Outcome::NotPresent);
    }

    #[tokio::test]
    async fn server_error_on_one_uid_does_not_abort_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/workgroups/research:lab/members/auid"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/workgroups/research:lab/members/buid"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcomes =
            client(&server).add_members(&uids(&["auid", "buid"])).await.expect("add");
        assert_eq!(outcomes[0].outcome, Outcome::Applied);
        assert!(outcomes[1].outcome.is_failure());
    }

    #[tokio::test]
    async fn search_lists_workgroup_names_under_a_stem() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workgroups"))
            .and(query_param("stem", "research"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "research:lab"}, {"name": "research:alumni"}],
            })))
            .mount(&server)
            .await;

        let names = client(&server).search("research").await.expect("search");
        assert_eq!(names, vec!["research:lab", "research:alumni"]);
    }

    #[tokio::test]
    async fn forbidden_fetch_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workgroups/research:lab"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server).list_members().await.expect_err("must fail");
        assert!(matches!(err, RosterError::Auth(_)));
    }
}
