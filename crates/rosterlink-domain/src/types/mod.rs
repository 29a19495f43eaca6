//! Core domain types
//!
//! The common currency between all components is the [`MemberSet`]: a
//! canonical, case-normalized, deduplicated set of [`Uid`]s. Everything a
//! backend knows about membership is flattened into that shape before the
//! sync engine ever sees it.

pub mod credential;
pub mod member_set;
pub mod sync;
pub mod uid;

pub use credential::{Credential, CredentialMaterial, Provenance, Secret, ServiceKind};
pub use member_set::MemberSet;
pub use sync::{MemberOutcome, Outcome, SyncMode, SyncPlan, SyncReport};
pub use uid::Uid;
