//! # pf-protocol
//!
//! Core protocol definitions and data models for payflow.
//!
//! This crate defines all shared data structures used for:
//! - Agent identities and credentials
//! - Invocation results and per-agent run status
//! - Payment payloads and the enriched payloads built from them
//! - Execution history entries
//! - Structured product agreement requests
//! - Events streamed from the core to presentation layers
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent kinds, descriptors and credentials
//! - [`invocation_models`]: Outcome of one agent call
//! - [`payment_models`]: Payment request, check results, orchestrator payload
//! - [`history_models`]: Execution history entries and filters
//! - [`pipeline_models`]: The nine pipeline steps
//! - [`run_models`]: Agent status, work log lines, run results
//! - [`spa_models`]: Document processing requests for the orchestrator
//! - [`ipc`]: Events emitted while a run progresses
//!
//! ## Design Principles
//!
//! - Minimal dependencies: only serde, ts-rs, uuid and chrono
//! - TypeScript generation: status and event types derive `TS` for web clients
//! - Independent compilation: no dependencies on other payflow crates

pub mod agent_models;
pub mod history_models;
pub mod invocation_models;
pub mod ipc;
pub mod payment_models;
pub mod pipeline_models;
pub mod run_models;
pub mod spa_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use history_models::*;
pub use invocation_models::*;
pub use ipc::*;
pub use payment_models::*;
pub use pipeline_models::*;
pub use run_models::*;
pub use spa_models::*;
