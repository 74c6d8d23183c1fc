//! Agent identity and credential models.
//!
//! The set of remote agents is fixed for the lifetime of the process. Each
//! agent is addressed by a logical name (`payment_validator`, ...) and is
//! reachable only when an identifier/alias pair has been configured for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// The remote agents known to the payment dashboard.
///
/// Serialized as the logical name, e.g. `"payment_validator"`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Final step of the payment pipeline; receives the enriched payload.
    PaymentOrchestrator,

    /// Checks the `CardDetails` section of a payment request.
    PaymentValidator,

    /// Screens the `CustomerDetails` section against sanction lists.
    SanctionCheck,
}

impl AgentKind {
    /// All agents, in the order they are presented to operators.
    pub const ALL: [AgentKind; 3] = [
        AgentKind::PaymentOrchestrator,
        AgentKind::PaymentValidator,
        AgentKind::SanctionCheck,
    ];

    /// The logical name used in configuration keys and history rows.
    pub fn logical_name(&self) -> &'static str {
        match self {
            Self::PaymentOrchestrator => "payment_orchestrator",
            Self::PaymentValidator => "payment_validator",
            Self::SanctionCheck => "sanction_check",
        }
    }

    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PaymentOrchestrator => "Payment Orchestrator",
            Self::PaymentValidator => "Payment Validator",
            Self::SanctionCheck => "Sanction Check",
        }
    }

    pub fn descriptor(&self) -> AgentDescriptor {
        AgentDescriptor {
            name: self.logical_name().to_string(),
            display_name: self.display_name().to_string(),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Returned when a logical name does not match any known agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.logical_name() == s)
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

/// Display name for an arbitrary logical name.
///
/// Known agents use their fixed display name; anything else is title-cased
/// with underscores turned into spaces (`spa_processing` -> `Spa Processing`).
pub fn display_name_for(logical_name: &str) -> String {
    if let Ok(kind) = logical_name.parse::<AgentKind>() {
        return kind.display_name().to_string();
    }

    logical_name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Static description of an agent: its logical name and display name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct AgentDescriptor {
    pub name: String,
    pub display_name: String,
}

/// Identifier/alias pair addressing one remote agent.
///
/// Absent values are empty strings, never `None`, so the configured check
/// stays a plain emptiness test.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct AgentCredentials {
    pub agent_id: String,
    pub alias_id: String,
}

impl AgentCredentials {
    pub fn new(agent_id: impl Into<String>, alias_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            alias_id: alias_id.into(),
        }
    }

    /// An agent is configured iff both identifiers are non-empty.
    pub fn is_configured(&self) -> bool {
        !self.agent_id.is_empty() && !self.alias_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_names_round_trip_through_from_str() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.logical_name().parse::<AgentKind>(), Ok(kind));
        }
        assert!("payment".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_display_name_for_unknown_agent() {
        assert_eq!(display_name_for("sanction_check"), "Sanction Check");
        assert_eq!(display_name_for("spa_processing"), "Spa Processing");
        assert_eq!(display_name_for(""), "");
    }

    #[test]
    fn test_credentials_configured_requires_both_ids() {
        assert!(AgentCredentials::new("AGENT1", "ALIAS1").is_configured());
        assert!(!AgentCredentials::new("AGENT1", "").is_configured());
        assert!(!AgentCredentials::new("", "ALIAS1").is_configured());
        assert!(!AgentCredentials::default().is_configured());
    }

    #[test]
    fn test_agent_kind_serializes_as_logical_name() {
        let json = serde_json::to_value(AgentKind::SanctionCheck).unwrap();
        assert_eq!(json, "sanction_check");
    }
}
