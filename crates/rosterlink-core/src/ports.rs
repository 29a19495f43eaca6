//! Port interface for membership backends

use async_trait::async_trait;
use rosterlink_domain::{MemberOutcome, MemberSet, Result};

/// Capability contract shared by every membership backend.
///
/// Implementations bind one credential to one remote collection (a
/// workgroup stem+name, a mailing-list id, a registry organization) and
/// own nothing beyond a lazily populated member cache.
///
/// Contract notes:
/// - `list_members` must page through the backend transparently and
///   return one flattened [`MemberSet`].
/// - Mutations return one [`MemberOutcome`] per requested UID, never a
///   single boolean for a batch. Backend batch-size limits are split
///   into multiple requests inside the adapter.
/// - Adapters never retry an already-applied partial batch; retries, if
///   any, belong to the caller and are keyed by UID so they stay
///   idempotent.
/// - Read-only backends reject mutations with
///   [`rosterlink_domain::RosterError::Unsupported`] before any network
///   call.
#[async_trait]
pub trait MemberService: Send + Sync {
    /// Human-readable identity of the bound collection, for logs and
    /// reports (e.g. `workgroup:research:lab-staff`).
    fn label(&self) -> String;

    /// Fetch current membership as a canonical set.
    async fn list_members(&self) -> Result<MemberSet>;

    /// Add the given members, reporting per-UID outcomes.
    async fn add_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>>;

    /// Remove the given members, reporting per-UID outcomes.
    async fn remove_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>>;
}
