//! Test fixtures: credentials, payment requests and scripted runtimes.

use pf_core::agents::{AgentClient, MockReply, MockRuntime};
use pf_core::config::CredentialResolver;
use pf_core::engine::PaymentPipeline;
use pf_protocol::{AgentKind, Event, PaymentRequest};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const VALIDATOR_ID: &str = "VAL-AGENT";
pub const SANCTION_ID: &str = "SAN-AGENT";
pub const ORCHESTRATOR_ID: &str = "ORC-AGENT";

/// The agent id each kind is configured with in [`configured_env`].
#[allow(dead_code)]
pub fn agent_id(agent: AgentKind) -> &'static str {
    match agent {
        AgentKind::PaymentValidator => VALIDATOR_ID,
        AgentKind::SanctionCheck => SANCTION_ID,
        AgentKind::PaymentOrchestrator => ORCHESTRATOR_ID,
    }
}

/// Environment with every agent configured.
pub fn configured_env() -> HashMap<String, String> {
    let mut env = HashMap::new();
    for agent in AgentKind::ALL {
        let prefix = agent.logical_name().to_uppercase();
        env.insert(format!("{prefix}_AGENT_ID"), agent_id(agent).to_string());
        env.insert(format!("{prefix}_AGENT_ALIAS_ID"), format!("{prefix}-ALIAS"));
    }
    env.insert("AWS_DEFAULT_REGION".to_string(), "eu-west-1".to_string());
    env
}

#[allow(dead_code)]
pub fn configured_resolver() -> CredentialResolver {
    CredentialResolver::from_source(&configured_env())
}

/// Resolver with `missing` left unset.
#[allow(dead_code)]
pub fn resolver_without(missing: AgentKind) -> CredentialResolver {
    let prefix = missing.logical_name().to_uppercase();
    let mut env = configured_env();
    env.remove(&format!("{prefix}_AGENT_ID"));
    CredentialResolver::from_source(&env)
}

/// The sample payment request operators start from.
#[allow(dead_code)]
pub fn sample_request() -> PaymentRequest {
    PaymentRequest::from_value(json!({
        "header": {
            "MerchantID": "Mrt1234567890",
            "TerminalID": "Trm1234567890"
        },
        "CardDetails": {
            "AccountNumber": "6006199750003330026",
            "Amount": "12.00",
            "CurrencyCode": "678",
            "ExpiryDate": "1226"
        },
        "CustomerDetails": {
            "CustomerName": "John Doe",
            "Country": "US"
        }
    }))
    .expect("sample request is an object")
}

/// A runtime where every agent answers its happy-path verdict.
#[allow(dead_code)]
pub fn approving_runtime() -> MockRuntime {
    MockRuntime::success()
        .with_completion(VALIDATOR_ID, "APPROVED")
        .with_completion(SANCTION_ID, "CLEAR")
        .with_completion(ORCHESTRATOR_ID, "PAYMENT_COMPLETE")
}

/// [`approving_runtime`] with `agent` rejected by the service.
#[allow(dead_code)]
pub fn runtime_failing(agent: AgentKind) -> MockRuntime {
    approving_runtime().with_reply(
        agent_id(agent),
        MockReply::service_error("ValidationException", "rejected by service"),
    )
}

#[allow(dead_code)]
pub fn pipeline_with(runtime: &MockRuntime, credentials: CredentialResolver) -> PaymentPipeline {
    PaymentPipeline::new(AgentClient::new(Arc::new(runtime.clone()), credentials))
}

/// Drain everything already sent on `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
