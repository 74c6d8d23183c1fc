//! Events emitted by the core while a pipeline run progresses.
//!
//! The core pushes these on a channel so a presentation layer (terminal,
//! web page, ...) can render live progress without polling run state.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stepStarted",
//!   "payload": {
//!     "run_id": "uuid-here",
//!     "step": "DELEGATE_VALIDATOR",
//!     "step_index": 2
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::agent_models::AgentKind;
use crate::pipeline_models::PipelineStep;
use crate::run_models::AgentState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new run has started; all statuses are pending and the log is empty.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
    },

    /// The run has moved to a new step.
    StepStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        step: PipelineStep,
        step_index: usize,
    },

    /// An agent's status or highlight changed.
    AgentStatusChanged {
        #[ts(type = "string")]
        run_id: Uuid,
        agent: AgentKind,
        state: AgentState,
        active: bool,
    },

    /// A line was appended to the work log.
    StepLogAppended {
        #[ts(type = "string")]
        run_id: Uuid,
        step: PipelineStep,
        message: String,
    },

    /// An entry was added to the history ledger.
    HistoryRecorded {
        #[ts(type = "string")]
        run_id: Uuid,
        session_id: String,
    },

    /// The run finished step 8.
    RunCompleted {
        #[ts(type = "string")]
        run_id: Uuid,
        all_checks_pass: bool,
        orchestrator_succeeded: bool,
    },
}

impl Event {
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id }
            | Event::StepStarted { run_id, .. }
            | Event::AgentStatusChanged { run_id, .. }
            | Event::StepLogAppended { run_id, .. }
            | Event::HistoryRecorded { run_id, .. }
            | Event::RunCompleted { run_id, .. } => *run_id,
        }
    }
}
