//! Result of a single agent invocation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Why an invocation did not produce a completion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The agent has no identifier/alias configured. No call was made.
    Configuration,

    /// The remote service reported an error.
    Transport,

    /// Anything else that went wrong while calling or decoding.
    Unexpected,
}

/// Outcome of one agent call. Immutable once produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum InvocationResult {
    Success {
        /// Concatenated text of every completion chunk.
        completion: String,
        /// Trace metadata returned alongside the completion, if any.
        #[ts(type = "unknown")]
        trace: Option<serde_json::Value>,
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Completion text for successes, `None` otherwise.
    pub fn completion(&self) -> Option<&str> {
        match self {
            Self::Success { completion, .. } => Some(completion),
            Self::Failure { .. } => None,
        }
    }

    /// Error message for failures, `None` otherwise.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Success { session_id, .. } => Some(session_id),
            Self::Failure { .. } => None,
        }
    }

    /// Completion text on success, error message on failure.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { completion, .. } => completion,
            Self::Failure { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_accessors() {
        let result = InvocationResult::Success {
            completion: "APPROVED".to_string(),
            trace: None,
            session_id: "payment_validator-abc".to_string(),
        };

        assert!(result.is_success());
        assert_eq!(result.completion(), Some("APPROVED"));
        assert_eq!(result.error_message(), None);
        assert_eq!(result.session_id(), Some("payment_validator-abc"));
        assert_eq!(result.text(), "APPROVED");
    }

    #[test]
    fn test_failure_serializes_with_kind() {
        let result = InvocationResult::Failure {
            kind: FailureKind::Configuration,
            message: "not configured".to_string(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["kind"], "CONFIGURATION");
        assert_eq!(result.failure_kind(), Some(FailureKind::Configuration));
    }
}
