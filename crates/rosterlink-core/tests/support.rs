//! Shared test doubles for engine integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rosterlink_core::MemberService;
use rosterlink_domain::{MemberOutcome, MemberSet, Outcome, Result, Uid};

/// In-memory membership backend that records traffic.
///
/// Mutations succeed unless the UID is listed in `failing`, in which case
/// the backend rejects that UID while still applying the rest of the
/// batch, like a real partial failure.
pub struct FakeService {
    label: String,
    members: Mutex<MemberSet>,
    failing: Vec<Uid>,
    pub list_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
}

impl FakeService {
    pub fn new(label: &str, members: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            members: Mutex::new(MemberSet::from_raw(members.iter().copied())),
            failing: Vec::new(),
            list_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, uids: &[&str]) -> Self {
        self.failing = uids.iter().filter_map(|s| Uid::new(s)).collect();
        self
    }

    pub fn current_members(&self) -> MemberSet {
        self.members.lock().expect("members mutex").clone()
    }
}

#[async_trait]
impl MemberService for FakeService {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn list_members(&self) -> Result<MemberSet> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current_members())
    }

    async fn add_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        let mut members = self.members.lock().expect("members mutex");
        let mut outcomes = Vec::new();
        for uid in uids {
            let outcome = if self.failing.contains(uid) {
                Outcome::Failed("backend rejected member".into())
            } else if members.insert(uid.clone()) {
                Outcome::Applied
            } else {
                Outcome::AlreadyPresent
            };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }
        Ok(outcomes)
    }

    async fn remove_members(&self, uids: &MemberSet) -> Result<Vec<MemberOutcome>> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let mut members = self.members.lock().expect("members mutex");
        let mut outcomes = Vec::new();
        for uid in uids {
            let outcome = if self.failing.contains(uid) {
                Outcome::Failed("backend rejected removal".into())
            } else if members.contains(uid) {
                let remaining: MemberSet =
                    members.iter().filter(|m| *m != uid).cloned().collect();
                *members = remaining;
                Outcome::Applied
            } else {
                Outcome::NotPresent
            };
            outcomes.push(MemberOutcome::new(uid.clone(), outcome));
        }
        Ok(outcomes)
    }
}
