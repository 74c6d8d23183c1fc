//! Embedded template files for `.payflow/` initialization.
//!
//! Files under the crate's `templates/` directory are compiled into the
//! binary with `rust-embed`; with `debug-embed` they are still embedded in
//! debug builds, so tests see exactly what ships.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/templates"]
pub struct TemplateAssets;

pub const PAYMENT_TEMPLATE_PATH: &str = "payloads/payment.json";

/// Template content by path relative to `templates/`.
///
/// # Example
/// ```
/// use pf_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("halt_on_failed_checks"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// Template paths starting with `prefix`.
pub fn list_templates(prefix: &str) -> Vec<String> {
    TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect()
}

/// The sample payment request offered to operators.
pub fn default_payment_template() -> String {
    get_template(PAYMENT_TEMPLATE_PATH).unwrap_or_else(|| "{}".to_string())
}
