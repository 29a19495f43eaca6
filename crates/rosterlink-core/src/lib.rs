//! # Rosterlink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The `MemberService` port every backend adapter implements
//! - The member-set resolver that flattens heterogeneous inputs
//! - The sync engine (diff + apply with partial-failure reporting)
//! - The layered credential resolution protocol
//!
//! ## Architecture Principles
//! - Only depends on `rosterlink-domain`
//! - No HTTP, filesystem, or environment access
//! - All external dependencies via traits

pub mod credentials;
pub mod engine;
pub mod ports;
pub mod resolver;

// Re-export specific items to avoid ambiguity
pub use credentials::{CredentialSource, CredentialStore, Probe};
pub use engine::SyncEngine;
pub use ports::MemberService;
pub use resolver::MemberSource;
