//! # Rosterlink Infrastructure
//!
//! Impure adapters behind the core ports:
//! - HTTP client with retry and timeout support
//! - Concrete backend clients (workgroup directory, mailing lists,
//!   profile registry)
//! - Concrete credential sources (environment, config files, managed
//!   runtime, interactive consent)
//! - Configuration loading and tracing bootstrap

pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod services;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use credentials::default_store;
pub use errors::InfraError;
pub use http::HttpClient;
