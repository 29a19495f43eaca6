//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rosterlink_domain::RosterError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RosterError);

impl From<InfraError> for RosterError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RosterError> for InfraError {
    fn from(value: RosterError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRosterError {
    fn into_roster(self) -> RosterError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RosterError */
/* -------------------------------------------------------------------------- */

impl IntoRosterError for HttpError {
    fn into_roster(self) -> RosterError {
        if self.is_timeout() {
            return RosterError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return RosterError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RosterError::Internal(format!("failed to decode HTTP response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => RosterError::Auth(message),
                404 => RosterError::NotFound(message),
                429 => RosterError::Network(message),
                400..=499 => RosterError::InvalidInput(message),
                500..=599 => RosterError::Network(message),
                _ => RosterError::Network(message),
            };
        }

        RosterError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_roster())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → RosterError */
/* -------------------------------------------------------------------------- */

impl IntoRosterError for IoError {
    fn into_roster(self) -> RosterError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => RosterError::NotFound("file not found".into()),
            ErrorKind::PermissionDenied => {
                RosterError::Config("permission denied reading file".into())
            }
            _ => RosterError::Config(format!("filesystem error: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_roster())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → RosterError */
/* -------------------------------------------------------------------------- */

impl IntoRosterError for JsonError {
    fn into_roster(self) -> RosterError {
        RosterError::Config(format!("invalid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_roster())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
