//! Execution history records.

use crate::agent_models::display_name_for;
use crate::payment_models::PaymentSummary;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
pub enum HistoryStatus {
    Success,
    Failed,
}

/// One past invocation, as shown in the execution history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[ts(type = "string")]
    pub timestamp: DateTime<Local>,

    /// Logical name of the agent that was called.
    pub agent: String,

    /// The request body that was sent.
    #[ts(type = "unknown")]
    pub payload: serde_json::Value,

    /// Completion text, or the error text for failed calls.
    pub response: String,

    pub status: HistoryStatus,

    pub session_id: String,
}

impl HistoryEntry {
    /// Create an entry stamped with the current local time.
    pub fn now(
        agent: impl Into<String>,
        payload: serde_json::Value,
        response: impl Into<String>,
        status: HistoryStatus,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            agent: agent.into(),
            payload,
            response: response.into(),
            status,
            session_id: session_id.into(),
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`, the form used in history tables.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn agent_display_name(&self) -> String {
        display_name_for(&self.agent)
    }

    pub fn summary(&self) -> PaymentSummary {
        PaymentSummary::from_payload(&self.payload)
    }

    /// Structural identity used for removal.
    pub fn matches(&self, timestamp: &DateTime<Local>, session_id: &str) -> bool {
        self.timestamp == *timestamp && self.session_id == session_id
    }
}

/// Agent/status filter for history views.
///
/// An empty set places no restriction on that dimension.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct HistoryFilter {
    pub agents: BTreeSet<String>,
    pub statuses: BTreeSet<HistoryStatus>,
}

impl HistoryFilter {
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agents.insert(agent.into());
        self
    }

    pub fn with_status(mut self, status: HistoryStatus) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn accepts(&self, entry: &HistoryEntry) -> bool {
        (self.agents.is_empty() || self.agents.contains(&entry.agent))
            && (self.statuses.is_empty() || self.statuses.contains(&entry.status))
    }
}
