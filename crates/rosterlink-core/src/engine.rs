//! Service-agnostic synchronization engine
//!
//! Computes set differences between a source of identifiers and a
//! destination's membership, then applies additions and removals through
//! the destination's [`MemberService`]. Adds are applied before removes
//! so a full mirror never transits through an empty destination.
//!
//! The engine retries nothing: transport-level retry of idempotent
//! requests belongs to the adapter's HTTP client, and re-running a whole
//! engine operation is safe because a converged destination plans to a
//! no-op.

use std::sync::Arc;

use rosterlink_domain::{MemberOutcome, MemberSet, Outcome, Result, SyncMode, SyncPlan, SyncReport};
use tracing::{debug, info};

use crate::ports::MemberService;
use crate::resolver::MemberSource;

/// Orchestrates diff + apply across any pair of member sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncEngine;

impl SyncEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the plan for reconciling `dest` against `src`.
    ///
    /// Pure set algebra: `to_add = src − dest`; `to_remove = dest − src`
    /// only in [`SyncMode::Mirror`], otherwise empty.
    #[must_use]
    pub fn plan(src: &MemberSet, dest: &MemberSet, mode: SyncMode) -> SyncPlan {
        let to_add = src.difference(dest);
        let to_remove = match mode {
            SyncMode::Mirror => dest.difference(src),
            SyncMode::Additive => MemberSet::new(),
        };
        SyncPlan { to_add, to_remove }
    }

    /// Synchronize `dest` with `src` in the given mode.
    ///
    /// Resolves both sides, plans, applies adds then removes, and
    /// returns the per-UID report. Partial batch failures end up in the
    /// report, not in `Err`; already-converged destinations produce an
    /// empty report without touching the backend.
    pub async fn sync(
        &self,
        src: &MemberSource,
        dest: &Arc<dyn MemberService>,
        mode: SyncMode,
    ) -> Result<SyncReport> {
        let src_set = src.resolve().await?;
        let dest_set = dest.list_members().await?;
        let plan = Self::plan(&src_set, &dest_set, mode);

        info!(
            dest = %dest.label(),
            ?mode,
            to_add = plan.to_add.len(),
            to_remove = plan.to_remove.len(),
            "computed sync plan"
        );

        self.apply(&plan, dest).await
    }

    /// Copy members from `src` into `dest` without removing anything.
    pub async fn copy_to_service(
        &self,
        src: &MemberSource,
        dest: &Arc<dyn MemberService>,
    ) -> Result<SyncReport> {
        self.sync(src, dest, SyncMode::Additive).await
    }

    /// Remove the given members from `dest`.
    ///
    /// Only the intersection with the destination's current membership is
    /// sent to the backend; UIDs that were never present are reported as
    /// [`Outcome::NotPresent`] no-ops rather than errors.
    pub async fn remove_from_service(
        &self,
        uids: &MemberSource,
        dest: &Arc<dyn MemberService>,
    ) -> Result<SyncReport> {
        let requested = uids.resolve().await?;
        let dest_set = dest.list_members().await?;
        let to_remove = requested.intersection(&dest_set);

        let mut report = SyncReport::default();
        for absent in requested.difference(&dest_set) {
            report.removed.push(MemberOutcome::new(absent, Outcome::NotPresent));
        }

        if to_remove.is_empty() {
            debug!(dest = %dest.label(), "no requested members present; nothing to remove");
            return Ok(report);
        }

        report.removed.extend(dest.remove_members(&to_remove).await?);
        Ok(report)
    }

    /// Move members between services: copy `uids` into every destination,
    /// then remove them from every source.
    ///
    /// Returns one labeled report per touched service, destinations
    /// first. Copy-before-remove mirrors the add-before-remove ordering
    /// inside a single sync: the members are never absent from both
    /// sides at once.
    pub async fn transfer(
        &self,
        uids: &MemberSource,
        sources: &[Arc<dyn MemberService>],
        destinations: &[Arc<dyn MemberService>],
    ) -> Result<Vec<(String, SyncReport)>> {
        let mut reports = Vec::with_capacity(sources.len() + destinations.len());

        for dest in destinations {
            let report = self.copy_to_service(uids, dest).await?;
            reports.push((dest.label(), report));
        }
        for src in sources {
            let report = self.remove_from_service(uids, src).await?;
            reports.push((src.label(), report));
        }

        Ok(reports)
    }

    /// Apply a computed plan against the destination, adds first.
    async fn apply(&self, plan: &SyncPlan, dest: &Arc<dyn MemberService>) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        if plan.is_noop() {
            debug!(dest = %dest.label(), "destination already converged");
            return Ok(report);
        }

        if !plan.to_add.is_empty() {
            report.added = dest.add_members(&plan.to_add).await?;
        }
        if !plan.to_remove.is_empty() {
            report.removed = dest.remove_members(&plan.to_remove).await?;
        }

        if !report.is_clean() {
            let failed: Vec<_> = report.failures().map(|m| m.uid.as_str().to_string()).collect();
            info!(dest = %dest.label(), ?failed, "sync completed with partial failures");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use rosterlink_domain::MemberSet;

    use super::*;

    fn set(uids: &[&str]) -> MemberSet {
        MemberSet::from_raw(uids.iter().copied())
    }

    #[test]
    fn mirror_plan_computes_both_directions() {
        let plan = SyncEngine::plan(&set(&["auid", "buid"]), &set(&["buid", "cuid"]), SyncMode::Mirror);
        assert_eq!(plan.to_add, set(&["auid"]));
        assert_eq!(plan.to_remove, set(&["cuid"]));
    }

    #[test]
    fn additive_plan_never_removes() {
        let plan =
            SyncEngine::plan(&set(&["auid"]), &set(&["buid", "cuid"]), SyncMode::Additive);
        assert_eq!(plan.to_add, set(&["auid"]));
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn to_add_is_disjoint_from_destination() {
        let src = set(&["auid", "buid", "cuid"]);
        let dest = set(&["buid"]);
        let plan = SyncEngine::plan(&src, &dest, SyncMode::Mirror);
        assert!(plan.to_add.intersection(&dest).is_empty());
    }

    #[test]
    fn converged_sets_plan_to_noop() {
        let members = set(&["auid", "buid"]);
        let plan = SyncEngine::plan(&members, &members, SyncMode::Mirror);
        assert!(plan.is_noop());
    }
}
