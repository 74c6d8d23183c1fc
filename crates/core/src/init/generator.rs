//! Directory structure and file generation for `.payflow/`.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::loader::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory in which `.payflow/` is created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.payflow/`.
    pub force: bool,

    /// Skip the sample payloads.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate the `.payflow/` directory.
///
/// ```text
/// .payflow/
/// ├── config.toml
/// ├── env.example
/// └── payloads/
///     └── payment.json (unless minimal)
/// ```
///
/// Returns the path of the created directory.
pub async fn generate_project_structure(options: InitOptions) -> InitResult<PathBuf> {
    let pf_dir = options.target_dir.join(CONFIG_DIR);

    if pf_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(pf_dir));
    }

    fs::create_dir_all(&pf_dir).map_err(|source| InitError::DirectoryCreate {
        path: pf_dir.clone(),
        source,
    })?;

    write_template_file(&pf_dir, "config.toml")?;
    write_template_file(&pf_dir, "env.example")?;

    if !options.minimal {
        for payload_path in list_templates("payloads/") {
            write_template_file(&pf_dir, &payload_path)?;
        }
    }

    Ok(pf_dir)
}

fn write_template_file(pf_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = pf_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_generate_structure_success() {
        let dir = tempdir().unwrap();
        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: false,
        };

        let pf_dir = generate_project_structure(options).await.unwrap();

        assert_eq!(pf_dir, dir.path().join(".payflow"));
        assert!(pf_dir.join("config.toml").exists());
        assert!(pf_dir.join("env.example").exists());
        assert!(pf_dir.join("payloads/payment.json").exists());

        // The generated config loads back cleanly.
        let config = load_config(dir.path()).await.unwrap();
        assert_eq!(config.transport.command.as_deref(), Some("payflow-gateway"));
    }

    #[tokio::test]
    async fn test_generate_structure_minimal() {
        let dir = tempdir().unwrap();
        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: true,
        };

        let pf_dir = generate_project_structure(options).await.unwrap();

        assert!(pf_dir.join("config.toml").exists());
        assert!(!pf_dir.join("payloads").exists());
    }

    #[tokio::test]
    async fn test_generate_structure_exists_without_force() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".payflow")).unwrap();

        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: false,
            minimal: false,
        };

        let result = generate_project_structure(options).await;
        assert!(matches!(result, Err(InitError::DirectoryExists(_))));
    }

    #[tokio::test]
    async fn test_generate_structure_exists_with_force() {
        let dir = tempdir().unwrap();
        let pf_dir = dir.path().join(".payflow");
        fs::create_dir_all(&pf_dir).unwrap();
        fs::write(pf_dir.join("config.toml"), "stale").unwrap();

        let options = InitOptions {
            target_dir: dir.path().to_path_buf(),
            force: true,
            minimal: false,
        };

        generate_project_structure(options).await.unwrap();

        let config = fs::read_to_string(pf_dir.join("config.toml")).unwrap();
        assert!(config.contains("[pipeline]"));
    }

    #[test]
    fn test_default_init_options() {
        let options = InitOptions::default();
        assert!(!options.force);
        assert!(!options.minimal);
    }
}
