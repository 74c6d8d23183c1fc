//! Configuration loading and credential resolution.
//!
//! Settings live in `.payflow/config.toml`; agent identifiers and the
//! region come from the environment through [`credentials::CredentialResolver`].

pub mod credentials;
pub mod error;
pub mod loader;
pub mod models;

pub use credentials::{CredentialResolver, CredentialSource, EnvSource};
pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::{AppConfig, PipelineSettings, TransportConfig};
