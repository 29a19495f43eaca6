//! Configuration loader
//!
//! Resolves the base config directory and the backend endpoint overrides.
//!
//! ## Loading Strategy
//! 1. `ROSTERLINK_CONFIG_DIR` overrides the base directory outright
//! 2. Otherwise `%APPDATA%\rosterlink` on Windows, `~/.config/rosterlink`
//!    elsewhere
//! 3. Endpoint overrides are read from `rosterlink.toml` inside the base
//!    directory when present; a missing file means defaults
//!
//! Per-service credential files inside the base directory are not read
//! here; the config-file credential source owns that layout.

use std::path::{Path, PathBuf};

use rosterlink_domain::{Result, RosterError, ServiceEndpoints, Settings};

/// Environment variable overriding the base config directory.
pub const CONFIG_DIR_ENV: &str = "ROSTERLINK_CONFIG_DIR";

const ENDPOINTS_FILE: &str = "rosterlink.toml";

/// Resolve process settings: base config directory plus endpoint
/// overrides.
///
/// # Errors
/// Returns `RosterError::Config` if no home directory can be determined
/// and no override is set, or if `rosterlink.toml` exists but does not
/// parse.
pub fn load() -> Result<Settings> {
    // A .env next to the process is a development convenience only.
    dotenvy::dotenv().ok();

    let config_dir = match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => default_config_dir()?,
    };

    let mut settings = Settings::new(&config_dir);
    let endpoints_path = config_dir.join(ENDPOINTS_FILE);
    if endpoints_path.exists() {
        settings.endpoints = load_from_file(&endpoints_path)?;
    }

    tracing::debug!(config_dir = %settings.config_dir.display(), "resolved settings");
    Ok(settings)
}

/// Platform-conventional base directory for credential and config files.
///
/// # Errors
/// Returns `RosterError::Config` when the platform home directory cannot
/// be determined.
pub fn default_config_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .map(|appdata| PathBuf::from(appdata).join("rosterlink"))
            .map_err(|_| RosterError::Config("APPDATA is not set".into()))
    }

    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config").join("rosterlink"))
            .map_err(|_| RosterError::Config("HOME is not set".into()))
    }
}

/// Parse endpoint overrides from a TOML file.
///
/// Fields omitted from the file keep their defaults, so a deployment can
/// override just one backend.
///
/// # Errors
/// Returns `RosterError::Config` if the file cannot be read or parsed.
pub fn load_from_file(path: &Path) -> Result<ServiceEndpoints> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RosterError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    toml::from_str(&contents)
        .map_err(|e| RosterError::Config(format!("invalid TOML in {}: {}", path.display(), e)))
}
