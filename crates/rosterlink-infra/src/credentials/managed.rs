//! Managed-runtime credential source
//!
//! Serverless and notebook platforms attach an ambient identity to the
//! process; no credential file exists and none is needed. Detection is by
//! marker environment variables: the platform-agnostic
//! `ROSTERLINK_MANAGED_RUNTIME`, plus the markers the supported platforms
//! set themselves (`K_REVISION` on Cloud Run, `COLAB_RELEASE_TAG` in
//! Colab). Only the cloud identity provider supports ambient identity;
//! every other service probes `Absent` here.

use rosterlink_core::{CredentialSource, Probe};
use rosterlink_domain::{Credential, CredentialMaterial, Provenance, ServiceKind};

pub const MANAGED_RUNTIME_ENV: &str = "ROSTERLINK_MANAGED_RUNTIME";
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

const PLATFORM_MARKERS: &[&str] = &[MANAGED_RUNTIME_ENV, "K_REVISION", "COLAB_RELEASE_TAG"];

/// Ambient identity of a managed execution context.
pub struct ManagedContextSource;

impl ManagedContextSource {
    fn in_managed_runtime() -> bool {
        PLATFORM_MARKERS.iter().any(|marker| {
            std::env::var(marker).map(|v| !v.trim().is_empty()).unwrap_or(false)
        })
    }
}

impl CredentialSource for ManagedContextSource {
    fn provenance(&self) -> Provenance {
        Provenance::ManagedContext
    }

    fn probe(&self, service: ServiceKind) -> Probe {
        if service != ServiceKind::Google || !Self::in_managed_runtime() {
            return Probe::Absent;
        }

        let project = std::env::var(PROJECT_ENV).ok().filter(|p| !p.trim().is_empty());
        Probe::Found(Credential::new(
            ServiceKind::Google,
            Provenance::ManagedContext,
            CredentialMaterial::ManagedIdentity { project },
        ))
    }
}
