//! Mock runtime implementation for testing.

use crate::agents::base::{
    AgentRuntime, CompletionEvent, InvokeRequest, InvokeResponse, TransportError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What the mock hands back for one agent id.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these events, then finish.
    Stream {
        events: Vec<Result<CompletionEvent, TransportError>>,
        trace: Option<serde_json::Value>,
    },

    /// Fail the call before any stream is produced.
    Reject(TransportError),
}

impl MockReply {
    /// A single-chunk completion.
    pub fn completion(text: impl Into<String>) -> Self {
        Self::Stream {
            events: vec![Ok(CompletionEvent::text(text))],
            trace: None,
        }
    }

    pub fn service_error(code: &str, message: &str) -> Self {
        Self::Reject(TransportError::Service {
            code: code.to_string(),
            message: message.to_string(),
        })
    }
}

/// Scripted runtime: replies are looked up by agent id, and every request
/// is captured so tests can assert on what was sent.
#[derive(Clone)]
pub struct MockRuntime {
    available: bool,
    replies: HashMap<String, MockReply>,
    fallback: MockReply,
    calls: Arc<Mutex<Vec<InvokeRequest>>>,
}

impl MockRuntime {
    pub fn new(available: bool, fallback: MockReply) -> Self {
        Self {
            available,
            replies: HashMap::new(),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every agent answers "Mock response".
    pub fn success() -> Self {
        Self::new(true, MockReply::completion("Mock response"))
    }

    pub fn unavailable() -> Self {
        Self::new(
            false,
            MockReply::Reject(TransportError::NotAvailable(
                "Mock runtime not available".to_string(),
            )),
        )
    }

    /// Every agent streams one chunk and then breaks mid-stream.
    pub fn failing() -> Self {
        Self::new(
            true,
            MockReply::Stream {
                events: vec![
                    Ok(CompletionEvent::text("partial")),
                    Err(TransportError::Execution("Mock failure".to_string())),
                ],
                trace: None,
            },
        )
    }

    pub fn with_reply(mut self, agent_id: impl Into<String>, reply: MockReply) -> Self {
        self.replies.insert(agent_id.into(), reply);
        self
    }

    pub fn with_completion(self, agent_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_reply(agent_id, MockReply::completion(text))
    }

    /// Requests received so far, in call order.
    pub fn calls(&self) -> Vec<InvokeRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn check_availability(&self) -> bool {
        self.available
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, TransportError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        if !self.available {
            return Err(TransportError::NotAvailable(
                "Mock runtime not available".to_string(),
            ));
        }

        let reply = self
            .replies
            .get(&request.agent_id)
            .unwrap_or(&self.fallback)
            .clone();

        match reply {
            MockReply::Reject(error) => Err(error),
            MockReply::Stream { events, trace } => Ok(InvokeResponse {
                completion: Box::pin(tokio_stream::iter(events)),
                trace,
                session_id: request.session_id,
            }),
        }
    }
}
