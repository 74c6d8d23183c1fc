//! Project initialization.
//!
//! Generates a `.payflow/` directory with:
//! - Pipeline and transport settings (`config.toml`)
//! - A credentials template (`env.example`)
//! - A sample payment payload (`payloads/payment.json`)
//!
//! # Example
//!
//! ```no_run
//! use pf_core::init::{generate_project_structure, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_project_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_project_structure, InitOptions};
pub use templates::{default_payment_template, get_template, list_templates};
