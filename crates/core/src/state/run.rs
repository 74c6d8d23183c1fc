//! Pipeline run state and its transitions.
//!
//! Every mutation of a [`PipelineRun`] goes through one of the functions
//! below, and each of them emits the matching [`Event`] so a presentation
//! layer can follow along. Sends on a closed channel are ignored.

use crate::state::step_log::StepLogRecorder;
use pf_protocol::{
    AgentKind, AgentState, AgentStatus, EnrichedPayload, Event, InvocationResult,
    OrchestratorPayload, PipelineResult, PipelineStep,
};
use std::collections::BTreeMap;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

static PENDING: AgentStatus = AgentStatus {
    state: AgentState::Pending,
    response: None,
    error: None,
    active: false,
};

/// The mutable aggregate of one pipeline execution.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub id: Uuid,

    /// `None` before step 0 has been entered.
    pub current_step: Option<PipelineStep>,

    pub statuses: BTreeMap<AgentKind, AgentStatus>,

    pub step_log: StepLogRecorder,

    pub enriched_payload: Option<EnrichedPayload>,

    pub orchestrator_payload: Option<OrchestratorPayload>,

    /// Set when the orchestrator call was skipped by policy.
    pub halted: bool,

    pub completed: bool,
}

impl Default for PipelineRun {
    fn default() -> Self {
        create_run()
    }
}

impl PipelineRun {
    pub fn status(&self, agent: AgentKind) -> &AgentStatus {
        self.statuses.get(&agent).unwrap_or(&PENDING)
    }

    fn status_mut(&mut self, agent: AgentKind) -> &mut AgentStatus {
        self.statuses.entry(agent).or_default()
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.current_step.map(|step| step.index())
    }
}

/// A fresh run: every agent pending, empty log.
pub fn create_run() -> PipelineRun {
    PipelineRun {
        id: Uuid::new_v4(),
        current_step: None,
        statuses: AgentKind::ALL
            .into_iter()
            .map(|agent| (agent, AgentStatus::default()))
            .collect(),
        step_log: StepLogRecorder::new(),
        enriched_payload: None,
        orchestrator_payload: None,
        halted: false,
        completed: false,
    }
}

/// Reset `run` for a new execution, whatever state the last one left.
pub fn reset_run(run: &mut PipelineRun, events_tx: &UnboundedSender<Event>) {
    *run = create_run();
    let _ = events_tx.send(Event::RunStarted { run_id: run.id });
}

/// Move to `step`.
pub fn enter_step(run: &mut PipelineRun, step: PipelineStep, events_tx: &UnboundedSender<Event>) {
    run.current_step = Some(step);
    let _ = events_tx.send(Event::StepStarted {
        run_id: run.id,
        step,
        step_index: step.index(),
    });
}

/// Append `message` to the log under the current step.
pub fn log_step(run: &mut PipelineRun, events_tx: &UnboundedSender<Event>, message: impl Into<String>) {
    let step = run.current_step.unwrap_or(PipelineStep::Receive);
    let message = message.into();
    run.step_log.append(step, message.clone());
    let _ = events_tx.send(Event::StepLogAppended {
        run_id: run.id,
        step,
        message,
    });
}

fn emit_status(run: &PipelineRun, agent: AgentKind, events_tx: &UnboundedSender<Event>) {
    let status = run.status(agent);
    let _ = events_tx.send(Event::AgentStatusChanged {
        run_id: run.id,
        agent,
        state: status.state,
        active: status.active,
    });
}

/// The agent's call is starting.
pub fn mark_running(run: &mut PipelineRun, agent: AgentKind, events_tx: &UnboundedSender<Event>) {
    let status = run.status_mut(agent);
    status.state = AgentState::Running;
    status.active = true;
    emit_status(run, agent, events_tx);
}

/// Store the outcome of the agent's call.
///
/// Success keeps the result as the response; failure keeps its message as
/// the error.
pub fn record_result(
    run: &mut PipelineRun,
    agent: AgentKind,
    result: &InvocationResult,
    events_tx: &UnboundedSender<Event>,
) {
    let status = run.status_mut(agent);
    match result {
        InvocationResult::Success { .. } => {
            status.state = AgentState::Success;
            status.response = Some(result.clone());
            status.error = None;
        }
        InvocationResult::Failure { message, .. } => {
            status.state = AgentState::Error;
            status.error = Some(message.clone());
        }
    }
    emit_status(run, agent, events_tx);
}

/// Mark the agent as not called, with `reason` as its error.
pub fn mark_skipped(
    run: &mut PipelineRun,
    agent: AgentKind,
    reason: impl Into<String>,
    events_tx: &UnboundedSender<Event>,
) {
    let status = run.status_mut(agent);
    status.state = AgentState::Error;
    status.error = Some(reason.into());
    status.active = false;
    emit_status(run, agent, events_tx);
}

pub fn set_active(
    run: &mut PipelineRun,
    agent: AgentKind,
    active: bool,
    events_tx: &UnboundedSender<Event>,
) {
    let status = run.status_mut(agent);
    if status.active == active {
        return;
    }
    status.active = active;
    emit_status(run, agent, events_tx);
}

/// Snapshot of the run for display.
pub fn snapshot(run: &PipelineRun) -> PipelineResult {
    let (enriched_payload, validation_passed, sanction_passed) = match &run.enriched_payload {
        Some(enriched) => (
            enriched.to_value(),
            enriched.validation_passed(),
            enriched.sanction_passed(),
        ),
        None => (serde_json::Value::Null, false, false),
    };

    PipelineResult {
        run_id: run.id,
        statuses: run.statuses.clone(),
        enriched_payload,
        orchestrator_payload: run
            .orchestrator_payload
            .as_ref()
            .and_then(|payload| serde_json::to_value(payload).ok()),
        validation_passed,
        sanction_passed,
        halted: run.halted,
        completed: run.completed,
    }
}

/// Mark the run complete and return its snapshot.
pub fn finish_run(run: &mut PipelineRun, events_tx: &UnboundedSender<Event>) -> PipelineResult {
    run.completed = true;
    let result = snapshot(run);
    let _ = events_tx.send(Event::RunCompleted {
        run_id: run.id,
        all_checks_pass: result.all_checks_pass(),
        orchestrator_succeeded: result.orchestrator_succeeded(),
    });
    result
}
