//! Member-set resolver
//!
//! Normalizes heterogeneous inputs — literal UID collections or any
//! [`MemberService`] — into one canonical [`MemberSet`]. This indirection
//! is what lets the sync engine treat "a list of UIDs from a CSV" and
//! "the current members of some other workgroup" identically, turning
//! cross-service sync into a single generic diff.

use std::sync::Arc;

use rosterlink_domain::{MemberSet, Result};
use tracing::debug;

use crate::ports::MemberService;

/// A source of members: either literal identifiers or a live backend.
#[derive(Clone)]
pub enum MemberSource {
    /// Raw identifiers; normalized (trimmed, lowercased, deduplicated,
    /// empties dropped) during resolution.
    Uids(Vec<String>),
    /// A backend whose current membership is the source.
    Service(Arc<dyn MemberService>),
}

impl MemberSource {
    /// Resolve this source into a canonical member set.
    pub async fn resolve(&self) -> Result<MemberSet> {
        match self {
            Self::Uids(raw) => {
                let set = MemberSet::from_raw(raw);
                debug!(raw = raw.len(), resolved = set.len(), "resolved literal uid collection");
                Ok(set)
            }
            Self::Service(service) => {
                let set = service.list_members().await?;
                debug!(service = %service.label(), members = set.len(), "resolved service membership");
                Ok(set)
            }
        }
    }
}

impl From<Vec<String>> for MemberSource {
    fn from(uids: Vec<String>) -> Self {
        Self::Uids(uids)
    }
}

impl From<&[&str]> for MemberSource {
    fn from(uids: &[&str]) -> Self {
        Self::Uids(uids.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<Arc<dyn MemberService>> for MemberSource {
    fn from(service: Arc<dyn MemberService>) -> Self {
        Self::Service(service)
    }
}

#[cfg(test)]
mod tests {
    use rosterlink_domain::Uid;

    use super::*;

    #[tokio::test]
    async fn literal_uids_are_normalized_and_deduplicated() {
        let source = MemberSource::from(vec![
            "AUid".to_string(),
            " auid ".to_string(),
            "buid".to_string(),
            "  ".to_string(),
        ]);

        let set = source.resolve().await.expect("resolve");
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Uid::new("auid").expect("uid")));
        assert!(set.contains(&Uid::new("buid").expect("uid")));
    }
}
