//! The fixed step sequence of the payment orchestration pipeline.
//!
//! The pipeline always walks these nine steps in order, exactly once each.
//! There is no branching: a failed agent call is recorded and the next step
//! still runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One ordinal step of the payment pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStep {
    /// Step 0: accept and parse the request. No external call.
    Receive,

    /// Step 1: check the request sections. Logged, never enforced.
    ValidateFormat,

    /// Step 2: send `CardDetails` to the payment validator.
    DelegateValidator,

    /// Step 3: send `CustomerDetails` to the sanction check.
    DelegateSanctionCheck,

    /// Step 4: fold the validator result into the enriched payload.
    MergeValidation,

    /// Step 5: fold the sanction result into the enriched payload.
    MergeSanction,

    /// Step 6: compute whether both checks passed.
    Decide,

    /// Step 7: send the merged payload to the payment orchestrator.
    InvokeOrchestrator,

    /// Step 8: close the run and archive it.
    Finalize,
}

impl PipelineStep {
    pub const ALL: [PipelineStep; 9] = [
        PipelineStep::Receive,
        PipelineStep::ValidateFormat,
        PipelineStep::DelegateValidator,
        PipelineStep::DelegateSanctionCheck,
        PipelineStep::MergeValidation,
        PipelineStep::MergeSanction,
        PipelineStep::Decide,
        PipelineStep::InvokeOrchestrator,
        PipelineStep::Finalize,
    ];

    /// Number of steps in a run.
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based position of this step.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable label used in the work log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Receive => "Receive payment request",
            Self::ValidateFormat => "Validate request format",
            Self::DelegateValidator => "Delegate to Payment Validator",
            Self::DelegateSanctionCheck => "Delegate to Sanction Check",
            Self::MergeValidation => "Merge validation results",
            Self::MergeSanction => "Merge sanction results",
            Self::Decide => "Evaluate check results",
            Self::InvokeOrchestrator => "Invoke Payment Orchestrator",
            Self::Finalize => "Finalize payment processing",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.index(), self.label())
    }
}
