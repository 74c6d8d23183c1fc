//! Settings read from `.payflow/config.toml`.
//!
//! ```toml
//! region = "eu-west-1"
//!
//! [pipeline]
//! halt_on_failed_checks = false
//! decode = "lenient"
//!
//! [transport]
//! command = "payflow-gateway"
//! args = ["invoke"]
//! working_dir = "gateway"
//! ```

use crate::agents::DecodeMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default gateway command used when `[transport]` names none.
pub const DEFAULT_TRANSPORT_COMMAND: &str = "payflow-gateway";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides `AWS_DEFAULT_REGION` when set.
    pub region: Option<String>,

    pub pipeline: PipelineSettings,

    pub transport: TransportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Skip the orchestrator call when validation or sanction checks fail.
    pub halt_on_failed_checks: bool,

    pub decode: DecodeMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub command: Option<String>,
    pub args: Vec<String>,

    /// Directory the gateway runs in. Relative paths resolve against the
    /// project root; unset means the root itself.
    pub working_dir: Option<PathBuf>,
}

impl TransportConfig {
    pub fn command_or_default(&self) -> &str {
        self.command.as_deref().unwrap_or(DEFAULT_TRANSPORT_COMMAND)
    }

    pub fn working_dir_in(&self, root: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        }
    }
}
