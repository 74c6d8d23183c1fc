//! Runtime state models for a pipeline run.
//!
//! This module defines the per-agent status objects, the timestamped work log
//! lines, and the result snapshot handed to presentation layers.

use crate::agent_models::AgentKind;
use crate::invocation_models::InvocationResult;
use crate::pipeline_models::PipelineStep;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle of one agent within a run.
///
/// Pending -> Running -> Success | Error
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    /// Created at run start; the agent has not been called yet.
    #[default]
    Pending,

    /// The call is in flight.
    Running,

    /// The call returned a completion.
    Success,

    /// The call failed or was skipped.
    Error,
}

/// Status of one agent, scoped to one pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct AgentStatus {
    pub state: AgentState,

    /// The invocation result once the call has returned.
    pub response: Option<InvocationResult>,

    /// Error text when the call failed.
    pub error: Option<String>,

    /// True only while this agent's step is the current step.
    ///
    /// Drives the "currently highlighted" indicator in the UI.
    pub active: bool,
}

impl AgentStatus {
    /// Back to `{pending, None, None, false}`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_pending(&self) -> bool {
        self.state == AgentState::Pending
            && self.response.is_none()
            && self.error.is_none()
            && !self.active
    }
}

/// One line in the work log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StepLogLine {
    pub step: PipelineStep,
    pub label: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl StepLogLine {
    /// `[HH:MM:SS.mmm] message`, as shown in the work log view.
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S%.3f"), self.message)
    }
}

/// Snapshot of a finished run, kept for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct PipelineResult {
    #[ts(type = "string")]
    pub run_id: Uuid,

    /// Final status of each of the three agents.
    pub statuses: BTreeMap<AgentKind, AgentStatus>,

    /// The original request plus `ValidationResults` and `SanctionResults`.
    #[ts(type = "unknown")]
    pub enriched_payload: serde_json::Value,

    /// The payload sent (or prepared) for the orchestrator.
    #[ts(type = "unknown")]
    pub orchestrator_payload: Option<serde_json::Value>,

    pub validation_passed: bool,
    pub sanction_passed: bool,

    /// True when the orchestrator call was skipped by policy.
    pub halted: bool,

    pub completed: bool,
}

impl PipelineResult {
    pub fn status(&self, agent: AgentKind) -> Option<&AgentStatus> {
        self.statuses.get(&agent)
    }

    pub fn all_checks_pass(&self) -> bool {
        self.validation_passed && self.sanction_passed
    }

    /// Whether the orchestrator call returned a completion.
    pub fn orchestrator_succeeded(&self) -> bool {
        self.status(AgentKind::PaymentOrchestrator)
            .map(|status| status.state == AgentState::Success)
            .unwrap_or(false)
    }
}
