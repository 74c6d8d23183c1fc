//! Per-session run state.
//!
//! This module provides:
//! - The step-indexed work log
//! - Pipeline run state and its transition functions
//! - The session context that owns a run and its history

pub mod run;
pub mod session;
pub mod step_log;

pub use run::PipelineRun;
pub use session::SessionContext;
pub use step_log::StepLogRecorder;
