//! Sync plans and per-member outcome reports

use serde::{Deserialize, Serialize};

use super::member_set::MemberSet;
use super::uid::Uid;

/// How a destination should be reconciled against a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Only add missing members, never remove.
    Additive,
    /// Make destination membership exactly equal to the source.
    Mirror,
}

/// The computed difference between a desired member set and a
/// destination's current member set. Transient: exists only for the
/// duration of one sync invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_add: MemberSet,
    pub to_remove: MemberSet,
}

impl SyncPlan {
    /// True when applying the plan would not touch the destination.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Result of applying one membership mutation for one UID.
///
/// Batch operations never collapse into a single boolean; every UID gets
/// its own outcome so callers and tests can assert on exact failed
/// subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The mutation was applied remotely.
    Applied,
    /// Add requested for a UID the destination already had.
    AlreadyPresent,
    /// Remove requested for a UID the destination did not have.
    NotPresent,
    /// The backend rejected the mutation for this UID.
    Failed(String),
}

impl Outcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One UID paired with what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberOutcome {
    pub uid: Uid,
    pub outcome: Outcome,
}

impl MemberOutcome {
    pub fn new(uid: Uid, outcome: Outcome) -> Self {
        Self { uid, outcome }
    }
}

/// Structured result of one sync/copy/remove invocation.
///
/// Partial failure is surfaced here rather than thrown: membership
/// changes that did land are still useful progress, and the engine never
/// rolls back UIDs that succeeded before a later one failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub added: Vec<MemberOutcome>,
    pub removed: Vec<MemberOutcome>,
}

impl SyncReport {
    /// All UIDs whose mutation the backend rejected.
    pub fn failures(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.added.iter().chain(self.removed.iter()).filter(|m| m.outcome.is_failure())
    }

    /// True when no per-UID mutation failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// True when the invocation had nothing to do.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> Uid {
        Uid::new(s).expect("valid uid")
    }

    #[test]
    fn empty_plan_is_noop() {
        assert!(SyncPlan::default().is_noop());
    }

    #[test]
    fn report_collects_failures_from_both_sides() {
        let report = SyncReport {
            added: vec![
                MemberOutcome::new(uid("auid"), Outcome::Applied),
                MemberOutcome::new(uid("buid"), Outcome::Failed("409".into())),
            ],
            removed: vec![MemberOutcome::new(uid("cuid"), Outcome::Failed("500".into()))],
        };
        let failed: Vec<_> = report.failures().map(|m| m.uid.as_str().to_string()).collect();
        assert_eq!(failed, vec!["buid", "cuid"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn clean_report_with_noop_outcomes() {
        let report = SyncReport {
            added: vec![MemberOutcome::new(uid("auid"), Outcome::AlreadyPresent)],
            removed: vec![MemberOutcome::new(uid("buid"), Outcome::NotPresent)],
        };
        assert!(report.is_clean());
        assert!(!report.is_noop());
    }
}
