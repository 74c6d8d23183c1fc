//! # pf-core
//!
//! Agent transport, history and the payment orchestration pipeline.
//!
//! This crate provides:
//! - Credential resolution and `.payflow/` settings
//! - The agent runtime abstraction and the client that decodes completions
//! - The bounded execution history
//! - Per-session run state and the step-indexed work log
//! - The nine-step payment pipeline
//!
//! ## Modules
//!
//! - [`config`]: Settings loading and credential resolution
//! - [`agents`]: Runtime trait, runtimes and the agent client
//! - [`history`]: Bounded history ledger
//! - [`state`]: Run state, work log and session context
//! - [`engine`]: Payment orchestration pipeline
//! - [`init`]: `.payflow/` project scaffolding

pub mod agents;
pub mod config;
pub mod engine;
pub mod history;
pub mod init;
pub mod state;
