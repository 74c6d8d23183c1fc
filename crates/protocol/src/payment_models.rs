//! Payment payload records.
//!
//! A payment request is a JSON object with the top-level sections `header`,
//! `request`, `PaymentDetails`, `CardDetails` and `CustomerDetails`. The
//! pipeline only looks inside `CardDetails` and `CustomerDetails`; every other
//! key is carried through to the enriched and final payloads untouched.
//!
//! # Example
//!
//! ```json
//! {
//!   "header": { "MerchantID": "Mrt1234567890", "OrderNumber": "AP005678" },
//!   "CardDetails": { "AccountNumber": "6006199750003330026", "Amount": "12.00" },
//!   "CustomerDetails": { "CustomerName": "John Doe" }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while validating a payload at the boundary.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payment request must be a JSON object")]
    NotAnObject,

    #[error("{0} must be a JSON object")]
    SectionNotAnObject(&'static str),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Text of a scalar JSON value. Strings are returned as-is, numbers and
/// booleans in their JSON spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A pass-through section that was present in the input, even as `null`.
/// Absent sections stay `None` through `#[serde(default)]`.
fn present_section<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The `CardDetails` section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct CardDetails(pub Map<String, Value>);

impl CardDetails {
    pub fn account_number(&self) -> Option<String> {
        self.0.get("AccountNumber").and_then(scalar_text)
    }

    pub fn amount(&self) -> Option<String> {
        self.0.get("Amount").and_then(scalar_text)
    }

    pub fn currency_code(&self) -> Option<String> {
        self.0.get("CurrencyCode").and_then(scalar_text)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// The `CustomerDetails` section.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct CustomerDetails(pub Map<String, Value>);

impl CustomerDetails {
    pub fn customer_name(&self) -> Option<String> {
        self.0.get("CustomerName").and_then(scalar_text)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// A raw payment request, validated at the boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PaymentRequest {
    /// `Some(Value::Null)` when the input carried `"header": null`.
    #[serde(
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub header: Option<Value>,

    #[serde(
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub request: Option<Value>,

    #[serde(
        rename = "PaymentDetails",
        default,
        deserialize_with = "present_section",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_details: Option<Value>,

    #[serde(rename = "CardDetails", default, skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,

    #[serde(
        rename = "CustomerDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_details: Option<CustomerDetails>,

    /// Any other top-level keys, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentRequest {
    /// Validate a parsed JSON document and convert it into a request.
    ///
    /// The document must be an object, and `CardDetails` / `CustomerDetails`
    /// must be objects when present.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let object = value.as_object().ok_or(PayloadError::NotAnObject)?;

        for section in ["CardDetails", "CustomerDetails"] {
            if let Some(inner) = object.get(section) {
                if !inner.is_object() {
                    return Err(PayloadError::SectionNotAnObject(section));
                }
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// `CardDetails` as sent to the validator; `{}` when absent.
    pub fn card_details_value(&self) -> Value {
        self.card_details
            .as_ref()
            .map(CardDetails::to_value)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// `CustomerDetails` as sent to the sanction check; `{}` when absent.
    pub fn customer_details_value(&self) -> Value {
        self.customer_details
            .as_ref()
            .map(CustomerDetails::to_value)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Names of the expected top-level sections that are missing. A section
    /// given as `null` counts as present.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.header.is_none() {
            missing.push("header");
        }
        if self.request.is_none() {
            missing.push("request");
        }
        if self.payment_details.is_none() {
            missing.push("PaymentDetails");
        }
        if self.card_details.is_none() {
            missing.push("CardDetails");
        }
        if self.customer_details.is_none() {
            missing.push("CustomerDetails");
        }
        missing
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Success,
    Failed,
}

/// `ValidationResults` / `SanctionResults` entry of the enriched payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    #[serde(rename = "Status")]
    pub status: CheckStatus,

    /// Completion text on success, error text on failure.
    #[serde(rename = "Details")]
    pub details: String,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Success
    }
}

/// The original request with the two check results folded in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EnrichedPayload {
    #[serde(flatten)]
    pub request: PaymentRequest,

    #[serde(
        rename = "ValidationResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_results: Option<CheckResult>,

    #[serde(
        rename = "SanctionResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sanction_results: Option<CheckResult>,
}

impl EnrichedPayload {
    pub fn new(request: PaymentRequest) -> Self {
        Self {
            request,
            validation_results: None,
            sanction_results: None,
        }
    }

    pub fn validation_passed(&self) -> bool {
        self.validation_results
            .as_ref()
            .map(CheckResult::passed)
            .unwrap_or(false)
    }

    pub fn sanction_passed(&self) -> bool {
        self.sanction_results
            .as_ref()
            .map(CheckResult::passed)
            .unwrap_or(false)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Action requested from the orchestrator.
pub const PROCESS_PAYMENT_ACTION: &str = "processPayment";

/// The payload handed to the payment orchestrator at step 7.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorPayload {
    pub original_request: PaymentRequest,
    pub validation_results: Option<CheckResult>,
    pub sanction_results: Option<CheckResult>,
    pub action: String,
    pub all_checks_pass: bool,
}

impl OrchestratorPayload {
    pub fn from_enriched(enriched: &EnrichedPayload) -> Self {
        let all_checks_pass = enriched.validation_passed() && enriched.sanction_passed();
        Self {
            original_request: enriched.request.clone(),
            validation_results: enriched.validation_results.clone(),
            sanction_results: enriched.sanction_results.clone(),
            action: PROCESS_PAYMENT_ACTION.to_string(),
            all_checks_pass,
        }
    }
}

/// Key fields of a payment, for history tables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub merchant_id: String,
    pub order_number: String,
    pub amount: String,
    pub currency: String,
}

impl PaymentSummary {
    const UNKNOWN: &'static str = "Unknown";

    /// Extract the summary from any payload; missing fields read `"Unknown"`.
    pub fn from_payload(payload: &Value) -> Self {
        let lookup = |section: &str, key: &str| {
            payload
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(scalar_text)
                .unwrap_or_else(|| Self::UNKNOWN.to_string())
        };

        Self {
            merchant_id: lookup("header", "MerchantID"),
            order_number: lookup("header", "OrderNumber"),
            amount: lookup("CardDetails", "Amount"),
            currency: lookup("CardDetails", "CurrencyCode"),
        }
    }
}
