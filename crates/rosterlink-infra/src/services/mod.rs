//! Backend service clients
//!
//! Each client implements the `MemberService` port over the shared
//! retrying [`crate::http::HttpClient`]. Pagination and batch splitting
//! stay inside the client; the engine only ever sees `MemberSet`s and
//! per-UID outcomes.

pub mod mailinglist;
pub mod profiles;
pub mod workgroup;

pub use mailinglist::MailingListClient;
pub use profiles::{Profile, ProfileClient};
pub use workgroup::WorkgroupClient;

use reqwest::StatusCode;
use rosterlink_domain::{RosterError, ServiceKind};

/// Map a non-success HTTP status from a backend into a domain error.
pub(crate) fn status_error(service: ServiceKind, status: StatusCode, context: &str) -> RosterError {
    let message = format!(
        "{service}: {context} returned HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("unknown status")
    );
    match status.as_u16() {
        401 | 403 => RosterError::Auth(message),
        404 => RosterError::NotFound(message),
        400..=499 => RosterError::InvalidInput(message),
        _ => RosterError::Network(message),
    }
}
