//! Survey-platform mailing list client
//!
//! A client instance is bound to one mailing list inside one contact
//! directory. The platform's host is part of the credential (its
//! `data_center`), not of static configuration. Contacts carry the UID
//! as their external reference (`extRef`); the platform's own contact
//! ids are an implementation detail kept inside this module.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use rosterlink_core::MemberService;
use rosterlink_domain::{
    Credential, CredentialMaterial, MemberOutcome, MemberSet, Outcome, Result, RosterError,
    Secret, ServiceKind, Uid,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::InfraError;
use crate::http::HttpClient;
use crate::services::status_error;

pub struct MailingListClient {
    http: HttpClient,
    base_url: String,
    directory_id: String,
    list_id: String,
    auth: AuthHeader,
}

enum AuthHeader {
    ApiToken(Secret),
    Bearer(Secret),
}

#[derive(Deserialize)]
struct Paged<T> {
    result: PagedResult<T>,
}

#[derive(Deserialize)]
struct PagedResult<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
    #[serde(rename = "nextPage")]
    next_page: Option<String>,
}

#[derive(Deserialize, Clone)]
struct Contact {
    #[serde(rename = "contactId")]
    contact_id: String,
    #[serde(rename = "extRef")]
    ext_ref: Option<String>,
}

/// Directory-level listing entry.
#[derive(Debug, Deserialize)]
pub struct MailingListInfo {
    #[serde(rename = "mailingListId")]
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl MailingListClient {
    /// Build a client from a resolved mailing-list credential.
    ///
    /// An OAuth client-credentials pair is exchanged for a bearer token
    /// up front; an API token is used as-is.
    ///
    /// # Errors
    /// `RosterError::Config` for credential material this backend cannot
    /// use; transport errors from the token exchange.
    pub async fn connect(
        credential: &Credential,
        directory_id: impl Into<String>,
        list_id: impl Into<String>,
    ) -> Result<Self> {
        let http = HttpClient::new()?;

        let (base_url, auth) = match &credential.material {
            CredentialMaterial::ApiToken { host, token } => {
                (host_url(host), AuthHeader::ApiToken(token.clone()))
            }
            CredentialMaterial::OAuthClient {
                host: Some(host),
                client_id,
                client_secret,
            } => {
                let base_url = host_url(host);
                let token =
                    fetch_bearer_token(&http, &base_url, client_id, client_secret).await?;
                (base_url, AuthHeader::Bearer(token))
            }
            _ => {
                return Err(RosterError::Config(
                    "mailing-list client needs an API token or an OAuth pair with a data center"
                        .into(),
                ));
            }
        };

        Ok(Self {
            http,
            base_url,
            directory_id: directory_id.into(),
            list_id: list_id.into(),
            auth,
        })
    }

    /// Build a client over an existing transport, for tests and
    /// non-production endpoints.
    pub fn with_http(
        http: HttpClient,
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        directory_id: impl Into<String>,
        list_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            directory_id: directory_id.into(),
            list_id: list_id.into(),
            auth: AuthHeader::ApiToken(Secret::new(api_token.into())),
        }
    }

    fn authed(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth {
            AuthHeader::ApiToken(token) => builder.header("X-API-TOKEN", token.expose()),
            AuthHeader::Bearer(token) => builder.bearer_auth(token.expose()),
        }
    }

    fn contacts_url(&self) -> String {
        format!(
            "{}/API/v3/directories/{}/mailinglists/{}/contacts",
            self.base_url, self.directory_id, self.list_id
        )
    }

    /// Fetch every contact on the list, following `nextPage` cursors.
    async fn fetch_contacts(&self) -> Result<Vec<Contact>> {
        let mut contacts = Vec::new();
        let mut next = Some(self.contacts_url());

        while let Some(url) = next {
            let response = self.http.send(self.authed(Method::GET, &url)).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(ServiceKind::MailingList, status, "list contacts"));
            }

            let page: Paged<Contact> = response.json().await.map_err(|err| {
                let infra: InfraError = err.into();
                RosterError::from(infra)
            })?;

            contacts.extend(page.result.elements);
            next = page.result.next_page.filter(|n| !n.is_empty());
        }

        Ok(contacts)
    }

    /// Map each UID to the id of its first matching contact.
    fn contacts_by_uid(contacts: &[Contact]) -> BTreeMap<Uid, String> {
        let mut map = BTreeMap::new();
        for contact in contacts {
            let Some(uid) = contact.ext_ref.as_deref().and_then(Uid::new) else {
                continue;
            };
            map.entry(uid).or_insert_with(|| contact.contact_id.clone());
        }
        map
    }

    async fn delete_contact(&self, contact_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.contacts_url(), contact_id);
        let response = self.http.send(self.authed(Method::DELETE, &url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(ServiceKind::MailingList, status, "delete contact"));
        }
        Ok(())
    }

    /// Delete duplicate contacts sharing an external reference, keeping
    /// the first of each group. Returns the number of contacts removed.
    pub async fn dedupe(&self) -> Result<usize> {
        let contacts = self.fetch_contacts().await?;
        let keep = Self::contacts_by_uid(&contacts);

        let mut removed = 0;
        for contact in &contacts {
            let Some(uid) = contact.ext_ref.as_deref().and_then(Uid::new) else {
                continue;
            };
            if keep.get(&uid).map(String::as_str) != Some(contact.contact_id.as_str()) {
                self.delete_contact(&contact.contact_id).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(list = %self.label(), removed, "removed duplicate contacts");
        }
        Ok(removed)
    }

    /// List every mailing list in the contact directory.
    pub async fn list_mailing_lists(&self) -> Result<Vec<MailingListInfo>> {
        let mut lists = Vec::new();
        let mut next = Some(format!(
            "{}/API/v3/directories/{}/mailinglists",
            self.base_url, self.directory_id
        ));

        while let Some(url) = next {
            let response = self.http.send(self.authed(Method::GET, &url)).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(ServiceKind::MailingList, status, "list mailing lists"));
            }

            let page: Paged<MailingListInfo> = response.json().await.map_err(|err| {
                let infra: InfraError = err.into();
                RosterError::from(infra)
            })?;

            lists.extend(page.result.elements);
            next = page.result.next_page.filter(|n| !n.is_empty());
        }

        Ok(lists)
    }
}

#[async_trait]
impl MemberService for MailingListClient {
    fn label(&self) -> String {
        format!("mailinglist:{}", self.list_id)
    }

    async fn list_members(&self) -> Result<MemberSet> {
        let contacts = self.fetch_contacts().await?;
        Ok(contacts.iter().filter_map(|c| c.ext_ref.as_deref().and_then(Uid::new)).collect())
    }

    async fn add_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        let existing = self.list_members().await?;
        let mut outcomes = Vec::with_capacity(uids.len());

        for uid in uids {
            if existing.contains(uid) {
                outcomes.push(MemberOutcome::new(uid.clone(), Outcome::AlreadyPresent));
                continue;
            }

            // Creation is not idempotent: a replayed POST whose first
            // attempt already landed would create a duplicate contact.
            // One attempt only; a transient failure surfaces as a
            // per-UID outcome and the next sync run picks the UID up.
            let body = serde_json::json!({ "extRef": uid.as_str() });
            let outcome = match self
                .http
                .send_once(self.authed(Method::POST, &self.contacts_url()).json(&body))
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        Outcome::Applied
                    } else {
                        Outcome::Failed(
                            status_error(ServiceKind::MailingList, status, "create contact")
                                .to_string(),
                        )
                    }
                }
                Err(err) => Outcome::Failed(err.to_string()),
            };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }

        Ok(outcomes)
    }

    async fn remove_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        let contacts = self.fetch_contacts().await?;
        let by_uid = Self::contacts_by_uid(&contacts);
        let mut outcomes = Vec::with_capacity(uids.len());

        for uid in uids {
            let outcome = match by_uid.get(uid) {
                None => Outcome::NotPresent,
                Some(contact_id) => match self.delete_contact(contact_id).await {
                    Ok(()) => Outcome::Applied,
                    Err(err) => Outcome::Failed(err.to_string()),
                },
            };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }

        Ok(outcomes)
    }
}

fn host_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

async fn fetch_bearer_token(
    http: &HttpClient,
    base_url: &str,
    client_id: &str,
    client_secret: &Secret,
) -> Result<Secret> {
    let url = format!("{base_url}/oauth2/token");
    let params = [("grant_type", "client_credentials")];

    let response = http
        .send(
            http.request(Method::POST, url)
                .basic_auth(client_id, Some(client_secret.expose()))
                .form(&params),
        )
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(ServiceKind::MailingList, status, "token exchange"));
    }

    let body: TokenResponse = response.json().await.map_err(|err| {
        let infra: InfraError = err.into();
        RosterError::from(infra)
    })?;

    Ok(Secret::new(body.access_token))
}
