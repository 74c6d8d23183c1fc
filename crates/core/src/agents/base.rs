//! Base runtime trait and supporting types for remote agent calls.

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// A single remote invocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    /// The agent identifier.
    pub agent_id: String,

    /// The alias identifier of the deployed agent version.
    pub alias_id: String,

    /// Session identifier used for correlation on the remote side.
    pub session_id: String,

    /// The request body, already serialized to JSON text.
    pub input_text: String,

    /// Ask the remote side to stream trace events alongside the completion.
    pub enable_trace: bool,

    /// Region the call is addressed to.
    pub region: String,
}

impl InvokeRequest {
    /// Create a request with tracing enabled.
    pub fn new(
        agent_id: String,
        alias_id: String,
        session_id: String,
        input_text: String,
        region: String,
    ) -> Self {
        Self {
            agent_id,
            alias_id,
            session_id,
            input_text,
            enable_trace: true,
            region,
        }
    }

    /// Set whether trace events are requested.
    pub fn with_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }
}

/// One event of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    /// A completion chunk. `bytes` is `None` when the event carried no payload.
    Chunk { bytes: Option<Vec<u8>> },

    /// A trace event emitted alongside the completion.
    Trace(serde_json::Value),
}

impl CompletionEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Chunk {
            bytes: Some(text.into().into_bytes()),
        }
    }

    pub fn empty() -> Self {
        Self::Chunk { bytes: None }
    }
}

pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<CompletionEvent, TransportError>> + Send>>;

/// What the remote side hands back for an invocation.
pub struct InvokeResponse {
    /// Streamed completion chunks and trace events.
    pub completion: CompletionStream,

    /// Trace returned out-of-band, if the runtime provides one.
    pub trace: Option<serde_json::Value>,

    pub session_id: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Runtime not available: {0}")]
    NotAvailable(String),
    #[error("An error occurred ({code}) when calling the InvokeAgent operation: {message}")]
    Service { code: String, message: String },
    #[error("Stream parsing error: {0}")]
    StreamParse(String),
    #[error("Execution failed: {0}")]
    Execution(String),
    #[error("Malformed completion chunk: {0}")]
    MalformedChunk(String),
}

impl TransportError {
    /// True when the remote service itself reported the failure.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Self::Service { .. })
    }
}

/// The remote agent invocation capability.
///
/// Implementations perform the call and hand back the completion as a
/// stream; decoding and concatenation happen in
/// [`AgentClient`](crate::agents::client::AgentClient).
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn check_availability(&self) -> bool;
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, TransportError>;
}
