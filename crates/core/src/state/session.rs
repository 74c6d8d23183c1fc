//! Explicit per-session state.
//!
//! A `SessionContext` owns everything one operator session accumulates: the
//! current (or last) pipeline run, the history ledger and the last result
//! snapshot. It is passed by `&mut` into the pipeline; at most one run is in
//! flight per context, which the borrow guarantees.

use crate::history::HistoryLedger;
use crate::state::run::{create_run, PipelineRun};
use pf_protocol::{PipelineResult, StepLogLine};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub run: PipelineRun,
    pub history: HistoryLedger,
    pub last_result: Option<PipelineResult>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            run: create_run(),
            history: HistoryLedger::new(),
            last_result: None,
        }
    }

    /// Work log of the current run, ordered by step.
    pub fn work_log(&self) -> Vec<StepLogLine> {
        self.run.step_log.all_entries()
    }

    /// Drop the last result and history, keeping nothing from earlier runs.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
