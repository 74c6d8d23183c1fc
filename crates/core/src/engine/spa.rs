//! Structured product agreement processing.
//!
//! A single call to the payment orchestrator agent asking it to process a
//! document held in a bucket, together with a collaborator agent. There are
//! no pipeline steps: the call is made, decoded and recorded in the ledger
//! under [`SPA_HISTORY_AGENT`].

use crate::agents::client::{AgentClient, CallProfile};
use crate::history::HistoryLedger;
use chrono::{DateTime, Local};
use pf_protocol::{
    AgentKind, FailureKind, InvocationResult, SpaDocumentType, SpaPayload,
    DEFAULT_COLLABORATOR_AGENT,
};
use tracing::{info, warn};

/// Agent name recorded for SPA calls.
pub const SPA_HISTORY_AGENT: &str = "spa_processing";

/// The orchestrator handles SPA documents.
pub const SPA_AGENT: AgentKind = AgentKind::PaymentOrchestrator;

const SPA_SESSION_PREFIX: &str = "spa-processing";

/// `spa-processing-<investor>-<YYYYmmddHHMMSS>`.
pub fn spa_session_id(investor_id: &str, at: DateTime<Local>) -> String {
    format!(
        "{}-{}-{}",
        SPA_SESSION_PREFIX,
        investor_id,
        at.format("%Y%m%d%H%M%S")
    )
}

/// One document to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaRequest {
    pub bucket_path: String,
    pub investor_id: String,
    pub document_type: SpaDocumentType,
    pub collaborator: String,
}

impl SpaRequest {
    /// A `spa` document handled with the default collaborator.
    pub fn new(bucket_path: impl Into<String>, investor_id: impl Into<String>) -> Self {
        Self {
            bucket_path: bucket_path.into(),
            investor_id: investor_id.into(),
            document_type: SpaDocumentType::default(),
            collaborator: DEFAULT_COLLABORATOR_AGENT.to_string(),
        }
    }

    pub fn with_document_type(mut self, document_type: SpaDocumentType) -> Self {
        self.document_type = document_type;
        self
    }

    pub fn with_collaborator(mut self, collaborator: impl Into<String>) -> Self {
        self.collaborator = collaborator.into();
        self
    }

    pub fn payload(&self, at: DateTime<Local>) -> SpaPayload {
        SpaPayload::new(
            self.bucket_path.clone(),
            self.investor_id.clone(),
            self.document_type,
            self.collaborator.clone(),
            at,
        )
    }
}

/// Send `request` to the orchestrator and record the outcome.
///
/// Uses the orchestrator's credentials. When they are missing the result is
/// `Failure{Configuration}` and nothing is called or recorded.
pub async fn orchestrate_spa(
    client: &AgentClient,
    request: &SpaRequest,
    ledger: &mut HistoryLedger,
) -> InvocationResult {
    let now = Local::now();
    let body = match serde_json::to_value(request.payload(now)) {
        Ok(body) => body,
        Err(e) => {
            warn!(investor_id = %request.investor_id, error = %e, "SPA payload could not be encoded");
            return InvocationResult::Failure {
                kind: FailureKind::Unexpected,
                message: format!("Unexpected error: {e}"),
            };
        }
    };

    let profile = CallProfile {
        history_agent: SPA_HISTORY_AGENT.to_string(),
        label: "SPA processing".to_string(),
        session_id: spa_session_id(&request.investor_id, now),
        error_prefix: SPA_SESSION_PREFIX.to_string(),
    };

    info!(
        investor_id = %request.investor_id,
        document_type = %request.document_type,
        collaborator = %request.collaborator,
        "processing structured product agreement"
    );
    let region = client.region().to_string();
    client.invoke_as(SPA_AGENT, profile, &body, &region, ledger).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_spa_session_id_format() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 7).unwrap();
        assert_eq!(spa_session_id("I70897", at), "spa-processing-I70897-20240501093007");
    }

    #[test]
    fn test_request_defaults() {
        let request = SpaRequest::new("s3://bucket/doc.pdf", "I70897");
        assert_eq!(request.document_type, SpaDocumentType::Spa);
        assert_eq!(request.collaborator, DEFAULT_COLLABORATOR_AGENT);

        let request = request
            .with_document_type(SpaDocumentType::Prospectus)
            .with_collaborator("review-agent");
        let payload = request.payload(Local::now());
        assert_eq!(payload.document_details.document_type, SpaDocumentType::Prospectus);
        assert_eq!(payload.processing_details.collaborator_agent, "review-agent");
        assert_eq!(payload.document_details.s3_bucket_path, "s3://bucket/doc.pdf");
    }
}
