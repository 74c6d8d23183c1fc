//! Step-indexed work log.

use chrono::Local;
use pf_protocol::{PipelineStep, StepLogLine};
use std::collections::BTreeMap;

/// Ordered, append-only progress messages grouped by pipeline step.
///
/// Cleared with [`reset`](Self::reset) at the start of every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepLogRecorder {
    steps: BTreeMap<PipelineStep, Vec<StepLogLine>>,
}

impl StepLogRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a timestamped message under `step`.
    pub fn append(&mut self, step: PipelineStep, message: impl Into<String>) -> &StepLogLine {
        let lines = self.steps.entry(step).or_default();
        lines.push(StepLogLine {
            step,
            label: step.label().to_string(),
            timestamp: Local::now(),
            message: message.into(),
        });
        &lines[lines.len() - 1]
    }

    pub fn reset(&mut self) {
        self.steps.clear();
    }

    /// Every line, ordered by step index and then by append order.
    pub fn all_entries(&self) -> Vec<StepLogLine> {
        self.steps.values().flatten().cloned().collect()
    }

    pub fn entries_for(&self, step: PipelineStep) -> &[StepLogLine] {
        self.steps.get(&step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Steps that have at least one line, in index order.
    pub fn steps(&self) -> impl Iterator<Item = PipelineStep> + '_ {
        self.steps.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.steps.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.values().all(Vec::is_empty)
    }
}
