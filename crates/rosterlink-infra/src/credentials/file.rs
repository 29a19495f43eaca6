//! Config-directory credential source
//!
//! Looks for conventional per-service files under the base config
//! directory:
//!
//! - `workgroup.cert` + `workgroup.key`
//! - `mailinglist.json`
//! - `profiles.json`
//! - `google_service_account.json`
//!
//! A missing file is `Absent` (the next source gets a chance); a present
//! but malformed file is `Invalid`.

use std::path::{Path, PathBuf};

use rosterlink_core::{CredentialSource, Probe};
use rosterlink_domain::{Credential, CredentialMaterial, Provenance, ServiceKind};

use super::{parse_google_key, parse_mailinglist_json, parse_profiles_json};

pub const WORKGROUP_CERT_FILE: &str = "workgroup.cert";
pub const WORKGROUP_KEY_FILE: &str = "workgroup.key";
pub const MAILINGLIST_FILE: &str = "mailinglist.json";
pub const PROFILES_FILE: &str = "profiles.json";
pub const GOOGLE_KEY_FILE: &str = "google_service_account.json";

/// Conventional files under the base config directory.
pub struct ConfigFileSource {
    config_dir: PathBuf,
}

impl ConfigFileSource {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self { config_dir: config_dir.into() }
    }

    fn probe_workgroup(&self) -> Probe {
        let cert = self.config_dir.join(WORKGROUP_CERT_FILE);
        let key = self.config_dir.join(WORKGROUP_KEY_FILE);

        match (cert.is_file(), key.is_file()) {
            (false, false) => Probe::Absent,
            (true, true) => Probe::Found(Credential::new(
                ServiceKind::Workgroup,
                Provenance::ConfigFile,
                CredentialMaterial::MutualTls { cert_path: cert, key_path: key },
            )),
            (true, false) => Probe::Invalid(format!(
                "{} exists but {} is missing",
                cert.display(),
                key.display()
            )),
            (false, true) => Probe::Invalid(format!(
                "{} exists but {} is missing",
                key.display(),
                cert.display()
            )),
        }
    }

    fn probe_json(
        &self,
        service: ServiceKind,
        file_name: &str,
        parse: fn(&str) -> Result<CredentialMaterial, String>,
    ) -> Probe {
        let path = self.config_dir.join(file_name);
        if !path.is_file() {
            return Probe::Absent;
        }

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => return Probe::Invalid(format!("cannot read {}: {e}", path.display())),
        };

        match parse(&raw) {
            Ok(material) => {
                Probe::Found(Credential::new(service, Provenance::ConfigFile, material))
            }
            Err(reason) => Probe::Invalid(format!("{}: {reason}", path.display())),
        }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

impl CredentialSource for ConfigFileSource {
    fn provenance(&self) -> Provenance {
        Provenance::ConfigFile
    }

    fn probe(&self, service: ServiceKind) -> Probe {
        match service {
            ServiceKind::Workgroup => self.probe_workgroup(),
            ServiceKind::MailingList => {
                self.probe_json(service, MAILINGLIST_FILE, parse_mailinglist_json)
            }
            ServiceKind::Profiles => self.probe_json(service, PROFILES_FILE, parse_profiles_json),
            ServiceKind::Google => self.probe_json(service, GOOGLE_KEY_FILE, parse_google_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_directory_probes_absent_for_every_service() {
        let dir = TempDir::new().unwrap();
        let source = ConfigFileSource::new(dir.path());

        for service in [
            ServiceKind::Workgroup,
            ServiceKind::MailingList,
            ServiceKind::Profiles,
            ServiceKind::Google,
        ] {
            assert!(matches!(source.probe(service), Probe::Absent), "{service}");
        }
    }

    #[test]
    fn complete_cert_pair_is_found() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(WORKGROUP_CERT_FILE), "cert").unwrap();
        std::fs::write(dir.path().join(WORKGROUP_KEY_FILE), "key").unwrap();

        let source = ConfigFileSource::new(dir.path());
        match source.probe(ServiceKind::Workgroup) {
            Probe::Found(credential) => {
                assert_eq!(credential.provenance, Provenance::ConfigFile);
                assert!(matches!(credential.material, CredentialMaterial::MutualTls { .. }));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn orphaned_cert_without_key_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(WORKGROUP_CERT_FILE), "cert").unwrap();

        let source = ConfigFileSource::new(dir.path());
        assert!(matches!(source.probe(ServiceKind::Workgroup), Probe::Invalid(_)));
    }

    #[test]
    fn malformed_mailinglist_json_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MAILINGLIST_FILE), r#"{"api_token": "tok"}"#).unwrap();

        let source = ConfigFileSource::new(dir.path());
        assert!(matches!(source.probe(ServiceKind::MailingList), Probe::Invalid(_)));
    }

    #[test]
    fn valid_google_key_file_is_found() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(GOOGLE_KEY_FILE),
            r#"{"type": "service_account", "project_id": "proj"}"#,
        )
        .unwrap();

        let source = ConfigFileSource::new(dir.path());
        match source.probe(ServiceKind::Google) {
            Probe::Found(credential) => {
                assert!(matches!(credential.material, CredentialMaterial::ServiceAccountKey { .. }));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }
}
