//! Configuration file loader for the `.payflow/` directory.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::AppConfig;
use std::path::Path;

pub const CONFIG_DIR: &str = ".payflow";
pub const CONFIG_FILE: &str = "config.toml";

/// Loads `.payflow/config.toml` under `root`.
///
/// A missing `.payflow/` directory or `config.toml` yields the default
/// configuration rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has wrongly typed values
/// - `transport.command` is present but blank
///
/// # Example
///
/// ```rust,no_run
/// use pf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Halt on failed checks: {}", config.pipeline.halt_on_failed_checks);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content =
        tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::FileRead {
                path: config_path.clone(),
                source,
            })?;

    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.clone(),
        source,
    })?;

    if let Some(command) = &config.transport.command {
        if command.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: config_path,
                reason: "transport.command must not be blank".to_string(),
            });
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DecodeMode;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(root: &Path, content: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).expect("Failed to create .payflow");
        fs::write(dir.join(CONFIG_FILE), content).expect("Failed to write config.toml");
    }

    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_config(
            dir.path(),
            r#"region = "us-west-2"

[pipeline]
halt_on_failed_checks = true
decode = "strict"

[transport]
command = "gateway"
args = ["--profile", "payments"]
"#,
        );

        let config = load_config(dir.path()).await.expect("Failed to load config");

        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert!(config.pipeline.halt_on_failed_checks);
        assert_eq!(config.pipeline.decode, DecodeMode::Strict);
        assert_eq!(config.transport.command.as_deref(), Some("gateway"));
        assert_eq!(config.transport.args.len(), 2);
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .payflow");

        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_config(dir.path(), "[pipeline]\nhalt_on_failed_checks = true\n");

        let config = load_config(dir.path())
            .await
            .expect("Should handle partial config");

        assert!(config.pipeline.halt_on_failed_checks);
        assert_eq!(config.pipeline.decode, DecodeMode::Lenient);
        assert!(config.region.is_none());
        assert!(config.transport.command.is_none());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_config(dir.path(), "region = [unclosed");

        match load_config(dir.path()).await {
            Err(ConfigError::TomlParse { path, .. }) => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("Expected TomlParse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_config_unknown_decode_mode() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_config(dir.path(), "[pipeline]\ndecode = \"sloppy\"\n");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_blank_command() {
        let dir = tempdir().expect("Failed to create temp dir");
        write_config(dir.path(), "[transport]\ncommand = \"  \"\n");

        match load_config(dir.path()).await {
            Err(ConfigError::InvalidConfig { reason, .. }) => {
                assert!(reason.contains("transport.command"))
            }
            other => panic!("Expected InvalidConfig error, got {:?}", other),
        }
    }
}
