//! Structured product agreement (SPA) requests.
//!
//! An SPA request points the orchestrator agent at a document stored in a
//! bucket and names the collaborator agent it should work with. The body
//! sent to the agent looks like:
//!
//! ```json
//! {
//!   "documentDetails": {
//!     "s3BucketPath": "s3://spa-client-docs/SPA-docs/SPI-001/agreement.pdf",
//!     "investorId": "I70897",
//!     "documentType": "spa"
//!   },
//!   "processingDetails": {
//!     "collaboratorAgent": "spap-collaborator-agent",
//!     "requestTimestamp": "2024-05-01T09:30:00.000000"
//!   }
//! }
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Collaborator agent used when the operator names none.
pub const DEFAULT_COLLABORATOR_AGENT: &str = "spap-collaborator-agent";

/// Kind of document submitted for processing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpaDocumentType {
    #[default]
    Spa,
    TermSheet,
    Prospectus,
    Other,
}

impl SpaDocumentType {
    pub const ALL: [SpaDocumentType; 4] = [
        SpaDocumentType::Spa,
        SpaDocumentType::TermSheet,
        SpaDocumentType::Prospectus,
        SpaDocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spa => "spa",
            Self::TermSheet => "term_sheet",
            Self::Prospectus => "prospectus",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SpaDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown document type: {0} (expected spa, term_sheet, prospectus or other)")]
pub struct UnknownDocumentType(pub String);

impl FromStr for SpaDocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub s3_bucket_path: String,
    pub investor_id: String,
    pub document_type: SpaDocumentType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingDetails {
    pub collaborator_agent: String,
    /// Local time of the request, ISO 8601 without offset.
    pub request_timestamp: String,
}

/// The body sent to the orchestrator for one document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpaPayload {
    pub document_details: DocumentDetails,
    pub processing_details: ProcessingDetails,
}

impl SpaPayload {
    pub fn new(
        s3_bucket_path: impl Into<String>,
        investor_id: impl Into<String>,
        document_type: SpaDocumentType,
        collaborator_agent: impl Into<String>,
        requested_at: DateTime<Local>,
    ) -> Self {
        Self {
            document_details: DocumentDetails {
                s3_bucket_path: s3_bucket_path.into(),
                investor_id: investor_id.into(),
                document_type,
            },
            processing_details: ProcessingDetails {
                collaborator_agent: collaborator_agent.into(),
                request_timestamp: requested_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            },
        }
    }
}
