//! Agent client: credential check, invocation, decoding and history.
//!
//! The `AgentClient` is responsible for:
//! - Refusing calls for agents without credentials (no remote call is made)
//! - Deriving a deterministic session id from the agent and request body
//! - Concatenating the streamed completion into one text
//! - Classifying failures and recording every attempted call in the ledger

use crate::agents::base::{AgentRuntime, CompletionEvent, InvokeRequest, TransportError};
use crate::config::credentials::CredentialResolver;
use crate::history::HistoryLedger;
use chrono::Local;
use pf_protocol::{AgentKind, FailureKind, HistoryEntry, HistoryStatus, InvocationResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// How completion chunks are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Chunks without payload contribute nothing; invalid UTF-8 is replaced.
    #[default]
    Lenient,

    /// Chunks without payload or with invalid UTF-8 fail the call.
    Strict,
}

/// `<logical name>-<first 16 hex digits of SHA-256(body)>`.
pub fn session_id_for(agent: AgentKind, input_text: &str) -> String {
    let digest = Sha256::digest(input_text.as_bytes());
    let hex: String = digest
        .iter()
        .take(8)
        .map(|byte| format!("{:02x}", byte))
        .collect();
    format!("{}-{}", agent.logical_name(), hex)
}

/// Session id stored with failed calls.
fn error_session_id(prefix: &str) -> String {
    format!("{}-error-{}", prefix, Local::now().format("%H%M%S"))
}

pub fn not_configured_message(agent: AgentKind) -> String {
    format!(
        "{} agent not configured. Please set the agent ID and alias ID in your .env file.",
        agent.display_name()
    )
}

/// Map a transport failure to its kind and user-facing message. `label`
/// names the caller in service errors, e.g. `Payment Validator`.
pub fn classify_failure(label: &str, error: &TransportError) -> (FailureKind, String) {
    if error.is_service_error() {
        (
            FailureKind::Transport,
            format!("Error invoking {} agent: {}", label, error),
        )
    } else {
        (FailureKind::Unexpected, format!("Unexpected error: {}", error))
    }
}

/// Names one call is made and recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallProfile {
    /// Agent name stored in the history entry.
    pub history_agent: String,
    /// Name used in service error messages.
    pub label: String,
    pub session_id: String,
    /// Failed calls are recorded as `<prefix>-error-<HHMMSS>`.
    pub error_prefix: String,
}

impl CallProfile {
    /// The profile of a plain call to `agent` with `input_text`.
    pub fn for_agent(agent: AgentKind, input_text: &str) -> Self {
        Self {
            history_agent: agent.logical_name().to_string(),
            label: agent.display_name().to_string(),
            session_id: session_id_for(agent, input_text),
            error_prefix: agent.logical_name().to_string(),
        }
    }
}

struct Completion {
    text: String,
    trace: Option<serde_json::Value>,
    session_id: String,
}

pub struct AgentClient {
    runtime: Arc<dyn AgentRuntime>,
    credentials: CredentialResolver,
    decode: DecodeMode,
    region: String,
}

impl AgentClient {
    /// Create a client addressing the resolver's region with lenient decoding.
    pub fn new(runtime: Arc<dyn AgentRuntime>, credentials: CredentialResolver) -> Self {
        let region = credentials.region().to_string();
        Self {
            runtime,
            credentials,
            decode: DecodeMode::default(),
            region,
        }
    }

    pub fn with_decode_mode(mut self, decode: DecodeMode) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn decode_mode(&self) -> DecodeMode {
        self.decode
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn is_configured(&self, agent: AgentKind) -> bool {
        self.credentials.is_configured(agent)
    }

    pub async fn check_availability(&self) -> bool {
        self.runtime.check_availability().await
    }

    /// Invoke `agent` with `body` in the configured region.
    pub async fn invoke(
        &self,
        agent: AgentKind,
        body: &serde_json::Value,
        ledger: &mut HistoryLedger,
    ) -> InvocationResult {
        let region = self.region.clone();
        self.invoke_in_region(agent, body, &region, ledger).await
    }

    /// Invoke `agent` with `body`, addressing `region`.
    ///
    /// # Behavior
    ///
    /// 1. Unconfigured agent: `Failure{Configuration}`, no call, no ledger entry
    /// 2. Otherwise call the runtime and decode the streamed completion
    /// 3. Record the outcome in `ledger`, success or failure
    pub async fn invoke_in_region(
        &self,
        agent: AgentKind,
        body: &serde_json::Value,
        region: &str,
        ledger: &mut HistoryLedger,
    ) -> InvocationResult {
        let profile = CallProfile::for_agent(agent, &body.to_string());
        self.invoke_as(agent, profile, body, region, ledger).await
    }

    /// Invoke with `agent`'s credentials but record the call under `profile`.
    ///
    /// Workflows that reuse an agent for another purpose go through here.
    /// The configuration check and ledger rules are those of
    /// [`invoke_in_region`](Self::invoke_in_region).
    pub async fn invoke_as(
        &self,
        agent: AgentKind,
        profile: CallProfile,
        body: &serde_json::Value,
        region: &str,
        ledger: &mut HistoryLedger,
    ) -> InvocationResult {
        let credentials = self.credentials.credentials_for(agent);
        if !credentials.is_configured() {
            warn!(agent = agent.logical_name(), caller = %profile.history_agent, "agent not configured, call skipped");
            return InvocationResult::Failure {
                kind: FailureKind::Configuration,
                message: not_configured_message(agent),
            };
        }

        let request = InvokeRequest::new(
            credentials.agent_id,
            credentials.alias_id,
            profile.session_id.clone(),
            body.to_string(),
            region.to_string(),
        );

        debug!(caller = %profile.history_agent, session_id = %profile.session_id, region, "invoking agent");

        match self.call(request).await {
            Ok(completion) => {
                info!(
                    caller = %profile.history_agent,
                    session_id = %completion.session_id,
                    chars = completion.text.len(),
                    "agent call succeeded"
                );
                ledger.record(HistoryEntry::now(
                    profile.history_agent,
                    body.clone(),
                    completion.text.clone(),
                    HistoryStatus::Success,
                    completion.session_id.clone(),
                ));
                InvocationResult::Success {
                    completion: completion.text,
                    trace: completion.trace,
                    session_id: completion.session_id,
                }
            }
            Err(error) => {
                let (kind, message) = classify_failure(&profile.label, &error);
                warn!(caller = %profile.history_agent, ?kind, %error, "agent call failed");
                ledger.record(HistoryEntry::now(
                    profile.history_agent,
                    body.clone(),
                    message.clone(),
                    HistoryStatus::Failed,
                    error_session_id(&profile.error_prefix),
                ));
                InvocationResult::Failure { kind, message }
            }
        }
    }

    async fn call(&self, request: InvokeRequest) -> Result<Completion, TransportError> {
        let response = self.runtime.invoke(request).await?;
        let mut stream = response.completion;

        let mut text = String::new();
        let mut traces = Vec::new();

        while let Some(event) = stream.next().await {
            match event? {
                CompletionEvent::Chunk { bytes: Some(bytes) } => {
                    text.push_str(&self.decode_chunk(bytes)?);
                }
                CompletionEvent::Chunk { bytes: None } => {
                    if self.decode == DecodeMode::Strict {
                        return Err(TransportError::MalformedChunk(
                            "chunk without payload".to_string(),
                        ));
                    }
                }
                CompletionEvent::Trace(trace) => traces.push(trace),
            }
        }

        let trace = response.trace.or_else(|| {
            if traces.is_empty() {
                None
            } else {
                Some(serde_json::Value::Array(traces))
            }
        });

        Ok(Completion {
            text,
            trace,
            session_id: response.session_id,
        })
    }

    fn decode_chunk(&self, bytes: Vec<u8>) -> Result<String, TransportError> {
        match self.decode {
            DecodeMode::Lenient => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            DecodeMode::Strict => String::from_utf8(bytes)
                .map_err(|e| TransportError::MalformedChunk(format!("invalid UTF-8: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::adapters::{MockReply, MockRuntime};
    use serde_json::json;
    use std::collections::HashMap;

    fn resolver() -> CredentialResolver {
        let mut env = HashMap::new();
        for (key, value) in [
            ("PAYMENT_VALIDATOR_AGENT_ID", "VAL"),
            ("PAYMENT_VALIDATOR_AGENT_ALIAS_ID", "VAL-ALIAS"),
            ("SANCTION_CHECK_AGENT_ID", "SAN"),
            ("SANCTION_CHECK_AGENT_ALIAS_ID", "SAN-ALIAS"),
        ] {
            env.insert(key.to_string(), value.to_string());
        }
        CredentialResolver::from_source(&env)
    }

    fn client(runtime: MockRuntime) -> AgentClient {
        AgentClient::new(Arc::new(runtime), resolver())
    }

    #[test]
    fn test_session_id_is_deterministic() {
        let a = session_id_for(AgentKind::PaymentValidator, "{\"a\":1}");
        let b = session_id_for(AgentKind::PaymentValidator, "{\"a\":1}");
        let c = session_id_for(AgentKind::PaymentValidator, "{\"a\":2}");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("payment_validator-"));
        assert_eq!(a.len(), "payment_validator-".len() + 16);
    }

    #[tokio::test]
    async fn test_invoke_concatenates_chunks() {
        let runtime = MockRuntime::success().with_reply(
            "VAL",
            MockReply::Stream {
                events: vec![
                    Ok(CompletionEvent::text("APP")),
                    Ok(CompletionEvent::empty()),
                    Ok(CompletionEvent::Trace(json!({"step": 1}))),
                    Ok(CompletionEvent::text("ROVED")),
                ],
                trace: None,
            },
        );
        let client = client(runtime);
        let mut ledger = HistoryLedger::new();

        let result = client
            .invoke(AgentKind::PaymentValidator, &json!({"Amount": "12.00"}), &mut ledger)
            .await;

        assert_eq!(result.completion(), Some("APPROVED"));
        match &result {
            InvocationResult::Success { trace, session_id, .. } => {
                assert_eq!(trace, &Some(json!([{"step": 1}])));
                assert!(session_id.starts_with("payment_validator-"));
            }
            other => panic!("expected success, got {:?}", other),
        }

        assert_eq!(ledger.len(), 1);
        let entry = ledger.latest().unwrap();
        assert_eq!(entry.status, HistoryStatus::Success);
        assert_eq!(entry.response, "APPROVED");
        assert_eq!(entry.agent, "payment_validator");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_empty_chunk() {
        let runtime = MockRuntime::success().with_reply(
            "VAL",
            MockReply::Stream {
                events: vec![Ok(CompletionEvent::text("A")), Ok(CompletionEvent::empty())],
                trace: None,
            },
        );
        let client = client(runtime).with_decode_mode(DecodeMode::Strict);
        let mut ledger = HistoryLedger::new();

        let result = client
            .invoke(AgentKind::PaymentValidator, &json!({}), &mut ledger)
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Unexpected));
        assert!(result.text().starts_with("Unexpected error:"));
        assert_eq!(ledger.latest().unwrap().status, HistoryStatus::Failed);
    }

    #[tokio::test]
    async fn test_lenient_mode_replaces_invalid_utf8() {
        let runtime = MockRuntime::success().with_reply(
            "VAL",
            MockReply::Stream {
                events: vec![Ok(CompletionEvent::Chunk {
                    bytes: Some(vec![b'O', b'K', 0xff]),
                })],
                trace: None,
            },
        );
        let client = client(runtime);
        let mut ledger = HistoryLedger::new();

        let result = client
            .invoke(AgentKind::PaymentValidator, &json!({}), &mut ledger)
            .await;

        assert_eq!(result.completion(), Some("OK\u{fffd}"));
    }

    #[tokio::test]
    async fn test_unconfigured_agent_is_never_called() {
        let runtime = MockRuntime::success();
        let client = AgentClient::new(Arc::new(runtime.clone()), resolver());
        let mut ledger = HistoryLedger::new();

        let result = client
            .invoke(AgentKind::PaymentOrchestrator, &json!({}), &mut ledger)
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Configuration));
        assert_eq!(
            result.text(),
            "Payment Orchestrator agent not configured. Please set the agent ID and alias ID in your .env file."
        );
        assert_eq!(runtime.call_count(), 0);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_is_transport_failure() {
        let runtime = MockRuntime::success()
            .with_reply("SAN", MockReply::service_error("AccessDeniedException", "denied"));
        let client = client(runtime);
        let mut ledger = HistoryLedger::new();

        let result = client
            .invoke(AgentKind::SanctionCheck, &json!({"CustomerName": "John Doe"}), &mut ledger)
            .await;

        assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
        assert!(result.text().starts_with("Error invoking Sanction Check agent:"));
        assert!(result.text().contains("AccessDeniedException"));

        let entry = ledger.latest().unwrap();
        assert_eq!(entry.status, HistoryStatus::Failed);
        assert!(entry.session_id.starts_with("sanction_check-error-"));
    }

    #[tokio::test]
    async fn test_region_override_reaches_runtime() {
        let runtime = MockRuntime::success();
        let client = AgentClient::new(Arc::new(runtime.clone()), resolver());
        let mut ledger = HistoryLedger::new();

        client
            .invoke_in_region(AgentKind::PaymentValidator, &json!({}), "ap-south-1", &mut ledger)
            .await;
        client
            .invoke(AgentKind::PaymentValidator, &json!({}), &mut ledger)
            .await;

        let calls = runtime.calls();
        assert_eq!(calls[0].region, "ap-south-1");
        assert_eq!(calls[1].region, "us-east-1");
        assert_eq!(calls[0].agent_id, "VAL");
        assert_eq!(calls[0].alias_id, "VAL-ALIAS");
        assert!(calls[0].enable_trace);
    }
}
