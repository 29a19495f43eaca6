//! Layered credential resolution
//!
//! Credential discovery is an ordered walk over [`CredentialSource`]
//! steps. Each step probes one place credentials might live (environment
//! paths, environment content, config files, a managed execution
//! context, an interactive consent flow) and answers with a tagged
//! [`Probe`]:
//!
//! - `Found` stops the walk with the resolved credential;
//! - `Absent` silently advances to the next step;
//! - `Invalid` stops the walk with an error — a source that is present
//!   but malformed must fail loudly instead of silently falling through
//!   to the wrong credential.
//!
//! The distinction between `Absent` and `Invalid` is the primary source
//! of user-visible bugs in credential glue, which is why it is encoded in
//! the type rather than left to ad hoc error matching.

use rosterlink_domain::{Credential, Provenance, Result, RosterError, ServiceKind};
use tracing::debug;

/// Outcome of probing one credential source for one service.
#[derive(Debug)]
pub enum Probe {
    /// The source yielded usable credential material.
    Found(Credential),
    /// The source is not configured for this service; try the next one.
    Absent,
    /// The source is configured but unusable; abort resolution.
    Invalid(String),
}

/// One step in the resolution chain.
pub trait CredentialSource: Send + Sync {
    /// Provenance tag attached to credentials this source yields, also
    /// used in `CredentialInvalid` errors.
    fn provenance(&self) -> Provenance;

    /// Probe this source for the given service.
    fn probe(&self, service: ServiceKind) -> Probe;
}

/// Ordered chain of credential sources.
///
/// The store itself is stateless; callers (service clients) resolve once
/// at construction and cache the credential for their own lifetime.
pub struct CredentialStore {
    steps: Vec<Box<dyn CredentialSource>>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(steps: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { steps }
    }

    /// Resolve credentials for `service`, first success wins.
    ///
    /// # Errors
    /// - [`RosterError::CredentialInvalid`] as soon as any step reports a
    ///   present-but-malformed source (no fallback).
    /// - [`RosterError::CredentialNotFound`] when every step reports
    ///   `Absent`.
    pub fn resolve(&self, service: ServiceKind) -> Result<Credential> {
        for step in &self.steps {
            match step.probe(service) {
                Probe::Found(credential) => {
                    debug!(%service, source = %credential.provenance, "resolved credentials");
                    return Ok(credential);
                }
                Probe::Absent => {
                    debug!(%service, source = %step.provenance(), "credential source absent");
                }
                Probe::Invalid(reason) => {
                    return Err(RosterError::CredentialInvalid {
                        service,
                        provenance: step.provenance(),
                        reason,
                    });
                }
            }
        }
        Err(RosterError::CredentialNotFound { service })
    }
}
