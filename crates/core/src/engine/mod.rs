//! Payment orchestration pipeline.
//!
//! The `PaymentPipeline` walks the nine fixed steps of a payment run in
//! order, exactly once each:
//!
//! 0. receive the request
//! 1. check its sections (logged only)
//! 2. send `CardDetails` to the payment validator
//! 3. send `CustomerDetails` to the sanction check
//! 4. fold the validator result into the enriched payload
//! 5. fold the sanction result into the enriched payload
//! 6. decide whether both checks passed
//! 7. send the merged payload to the payment orchestrator
//! 8. finalize and archive
//!
//! Agent failures never abort a run. They are stored on the agent's status
//! and the next step runs anyway.
//!
//! [`spa`] holds the single-call document processing workflow.

pub mod spa;

use crate::agents::client::AgentClient;
use crate::config::models::PipelineSettings;
use crate::history::HistoryLedger;
use crate::state::run::{
    enter_step, finish_run, log_step, mark_running, mark_skipped, record_result, reset_run,
    set_active, PipelineRun,
};
use crate::state::session::SessionContext;
use pf_protocol::{
    AgentKind, CheckResult, CheckStatus, EnrichedPayload, Event, FailureKind, HistoryEntry, HistoryStatus,
    InvocationResult, OrchestratorPayload, PaymentRequest, PipelineResult, PipelineStep,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Agent name recorded for the run-level history entry.
pub const PIPELINE_HISTORY_AGENT: &str = "payment_pipeline";

pub const SKIPPED_ORCHESTRATOR_MESSAGE: &str = "Skipped: validation or sanction checks failed";

/// Decision policy applied at step 6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelinePolicy {
    /// Skip the orchestrator call when either check failed.
    pub halt_on_failed_checks: bool,
}

impl From<&PipelineSettings> for PipelinePolicy {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            halt_on_failed_checks: settings.halt_on_failed_checks,
        }
    }
}

pub struct PaymentPipeline {
    client: AgentClient,
    policy: PipelinePolicy,
}

impl PaymentPipeline {
    pub fn new(client: AgentClient) -> Self {
        Self {
            client,
            policy: PipelinePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PipelinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &AgentClient {
        &self.client
    }

    pub fn policy(&self) -> PipelinePolicy {
        self.policy
    }

    /// Run the pipeline for `request` against `session`.
    ///
    /// The session's run is reset first; its history receives every agent
    /// call plus a run-level entry when the orchestrator succeeds. The
    /// returned snapshot is also stored as `session.last_result`.
    pub async fn run(
        &self,
        session: &mut SessionContext,
        request: PaymentRequest,
        events_tx: &UnboundedSender<Event>,
    ) -> PipelineResult {
        let SessionContext { run, history, .. } = session;

        reset_run(run, events_tx);
        info!(run_id = %run.id, "payment run started");

        self.receive(run, &request, events_tx);
        self.validate_format(run, &request, events_tx);

        let validation = self.delegate_validator(run, &request, history, events_tx).await;
        let sanction = self.delegate_sanction_check(run, &request, history, events_tx).await;

        let mut enriched = EnrichedPayload::new(request);
        self.merge_validation(run, &mut enriched, &validation, events_tx);
        self.merge_sanction(run, &mut enriched, &sanction, events_tx);

        let proceed = self.decide(run, &enriched, events_tx);
        let orchestrator = self
            .invoke_orchestrator(run, &enriched, proceed, history, events_tx)
            .await;

        let result = self.finalize(run, &enriched, orchestrator.as_ref(), history, events_tx);
        session.last_result = Some(result.clone());
        result
    }

    fn receive(&self, run: &mut PipelineRun, request: &PaymentRequest, events_tx: &UnboundedSender<Event>) {
        enter_step(run, PipelineStep::Receive, events_tx);
        set_active(run, AgentKind::PaymentOrchestrator, true, events_tx);
        log_step(run, events_tx, "Payment request received by Payment Orchestrator");

        let sections = request.to_value().as_object().map(|o| o.len()).unwrap_or(0);
        log_step(
            run,
            events_tx,
            format!("Parsed request payload with {} top-level sections", sections),
        );
    }

    fn validate_format(
        &self,
        run: &mut PipelineRun,
        request: &PaymentRequest,
        events_tx: &UnboundedSender<Event>,
    ) {
        enter_step(run, PipelineStep::ValidateFormat, events_tx);
        log_step(run, events_tx, "Checking payment request format");

        let missing = request.missing_sections();
        if missing.is_empty() {
            log_step(run, events_tx, "All expected sections present");
        } else {
            for section in &missing {
                warn!(run_id = %run.id, section = *section, "payment request section missing");
            }
            log_step(
                run,
                events_tx,
                format!("Warning: missing sections: {}", missing.join(", ")),
            );
        }

        if request.card_details.is_none() {
            log_step(run, events_tx, "CardDetails absent; validator will receive an empty object");
        }
        if request.customer_details.is_none() {
            log_step(
                run,
                events_tx,
                "CustomerDetails absent; sanction check will receive an empty object",
            );
        }

        log_step(run, events_tx, "Format check complete");
    }

    async fn delegate_validator(
        &self,
        run: &mut PipelineRun,
        request: &PaymentRequest,
        history: &mut HistoryLedger,
        events_tx: &UnboundedSender<Event>,
    ) -> InvocationResult {
        enter_step(run, PipelineStep::DelegateValidator, events_tx);
        log_step(run, events_tx, "Extracting CardDetails for Payment Validator");

        let result = self
            .call_agent(
                run,
                AgentKind::PaymentValidator,
                &request.card_details_value(),
                history,
                events_tx,
            )
            .await;

        set_active(run, AgentKind::PaymentOrchestrator, false, events_tx);
        result
    }

    async fn delegate_sanction_check(
        &self,
        run: &mut PipelineRun,
        request: &PaymentRequest,
        history: &mut HistoryLedger,
        events_tx: &UnboundedSender<Event>,
    ) -> InvocationResult {
        enter_step(run, PipelineStep::DelegateSanctionCheck, events_tx);
        log_step(run, events_tx, "Extracting CustomerDetails for Sanction Check");

        let result = self
            .call_agent(
                run,
                AgentKind::SanctionCheck,
                &request.customer_details_value(),
                history,
                events_tx,
            )
            .await;

        set_active(run, AgentKind::PaymentValidator, false, events_tx);
        result
    }

    fn merge_validation(
        &self,
        run: &mut PipelineRun,
        enriched: &mut EnrichedPayload,
        validation: &InvocationResult,
        events_tx: &UnboundedSender<Event>,
    ) {
        enter_step(run, PipelineStep::MergeValidation, events_tx);
        set_active(run, AgentKind::PaymentOrchestrator, true, events_tx);
        set_active(run, AgentKind::SanctionCheck, false, events_tx);

        let check = check_result(validation);
        log_step(
            run,
            events_tx,
            format!("ValidationResults: {:?}", check.status),
        );
        enriched.validation_results = Some(check);
        run.enriched_payload = Some(enriched.clone());
    }

    fn merge_sanction(
        &self,
        run: &mut PipelineRun,
        enriched: &mut EnrichedPayload,
        sanction: &InvocationResult,
        events_tx: &UnboundedSender<Event>,
    ) {
        enter_step(run, PipelineStep::MergeSanction, events_tx);

        let check = check_result(sanction);
        log_step(run, events_tx, format!("SanctionResults: {:?}", check.status));
        enriched.sanction_results = Some(check);
        run.enriched_payload = Some(enriched.clone());
        log_step(run, events_tx, "Enriched payload assembled");
    }

    /// Returns whether the orchestrator should be called.
    fn decide(&self, run: &mut PipelineRun, enriched: &EnrichedPayload, events_tx: &UnboundedSender<Event>) -> bool {
        enter_step(run, PipelineStep::Decide, events_tx);

        let validation_passed = enriched.validation_passed();
        let sanction_passed = enriched.sanction_passed();

        log_step(
            run,
            events_tx,
            format!(
                "Validation {}",
                if validation_passed { "passed" } else { "failed" }
            ),
        );
        log_step(
            run,
            events_tx,
            format!(
                "Sanction check {}",
                if sanction_passed { "passed" } else { "failed" }
            ),
        );

        if validation_passed && sanction_passed {
            log_step(run, events_tx, "All checks passed; proceeding to Payment Orchestrator");
            return true;
        }

        if self.policy.halt_on_failed_checks {
            warn!(run_id = %run.id, validation_passed, sanction_passed, "checks failed, halting");
            log_step(run, events_tx, "Checks failed; orchestrator call will be skipped");
            false
        } else {
            warn!(run_id = %run.id, validation_passed, sanction_passed, "checks failed, continuing");
            log_step(
                run,
                events_tx,
                "Checks failed; continuing to Payment Orchestrator with allChecksPass=false",
            );
            true
        }
    }

    async fn invoke_orchestrator(
        &self,
        run: &mut PipelineRun,
        enriched: &EnrichedPayload,
        proceed: bool,
        history: &mut HistoryLedger,
        events_tx: &UnboundedSender<Event>,
    ) -> Option<InvocationResult> {
        enter_step(run, PipelineStep::InvokeOrchestrator, events_tx);

        let payload = OrchestratorPayload::from_enriched(enriched);
        run.orchestrator_payload = Some(payload.clone());

        if !proceed {
            run.halted = true;
            log_step(run, events_tx, "Payment Orchestrator call skipped");
            mark_skipped(
                run,
                AgentKind::PaymentOrchestrator,
                SKIPPED_ORCHESTRATOR_MESSAGE,
                events_tx,
            );
            return None;
        }

        log_step(
            run,
            events_tx,
            format!("Sending merged payload (allChecksPass={})", payload.all_checks_pass),
        );

        let body = match orchestrator_body(&payload) {
            Ok(body) => body,
            Err(failure) => {
                warn!(run_id = %run.id, "orchestrator payload could not be encoded");
                record_result(run, AgentKind::PaymentOrchestrator, &failure, events_tx);
                if let Some(message) = failure.error_message() {
                    log_step(run, events_tx, format!("Payment Orchestrator failed: {message}"));
                }
                return Some(failure);
            }
        };
        let result = self
            .call_agent(run, AgentKind::PaymentOrchestrator, &body, history, events_tx)
            .await;
        Some(result)
    }

    fn finalize(
        &self,
        run: &mut PipelineRun,
        enriched: &EnrichedPayload,
        orchestrator: Option<&InvocationResult>,
        history: &mut HistoryLedger,
        events_tx: &UnboundedSender<Event>,
    ) -> PipelineResult {
        enter_step(run, PipelineStep::Finalize, events_tx);
        for agent in AgentKind::ALL {
            set_active(run, agent, false, events_tx);
        }

        match orchestrator {
            Some(InvocationResult::Success {
                completion,
                session_id: orchestrator_session,
                ..
            }) => {
                let session_id = format!("pipeline-{}", run.id);
                history.record(HistoryEntry::now(
                    PIPELINE_HISTORY_AGENT,
                    enriched.request.to_value(),
                    completion.clone(),
                    HistoryStatus::Success,
                    session_id.clone(),
                ));
                let _ = events_tx.send(Event::HistoryRecorded {
                    run_id: run.id,
                    session_id,
                });
                log_step(run, events_tx, "Payment processing complete");
                info!(run_id = %run.id, %orchestrator_session, "payment orchestrated");
            }
            Some(_) => {
                log_step(run, events_tx, "Payment processing finished with orchestrator error");
            }
            None => {
                log_step(run, events_tx, "Payment processing halted before orchestration");
            }
        }

        let result = finish_run(run, events_tx);
        info!(
            run_id = %run.id,
            all_checks_pass = result.all_checks_pass(),
            orchestrator_succeeded = result.orchestrator_succeeded(),
            "payment run finished"
        );
        result
    }

    /// One agent call with its status transitions and log lines.
    async fn call_agent(
        &self,
        run: &mut PipelineRun,
        agent: AgentKind,
        body: &serde_json::Value,
        history: &mut HistoryLedger,
        events_tx: &UnboundedSender<Event>,
    ) -> InvocationResult {
        mark_running(run, agent, events_tx);
        log_step(run, events_tx, format!("Invoking {}", agent.display_name()));

        let result = self.client.invoke(agent, body, history).await;
        record_result(run, agent, &result, events_tx);

        match &result {
            InvocationResult::Success { completion, .. } => {
                log_step(
                    run,
                    events_tx,
                    format!("{} responded: {}", agent.display_name(), completion),
                );
            }
            InvocationResult::Failure { message, .. } => {
                log_step(
                    run,
                    events_tx,
                    format!("{} failed: {}", agent.display_name(), message),
                );
            }
        }

        result
    }
}

/// JSON body sent to the orchestrator. An encoding error becomes an
/// `Unexpected` failure instead of a `null` body.
pub fn orchestrator_body(payload: &OrchestratorPayload) -> Result<serde_json::Value, InvocationResult> {
    serde_json::to_value(payload).map_err(|e| InvocationResult::Failure {
        kind: FailureKind::Unexpected,
        message: format!("Unexpected error: {e}"),
    })
}

/// `{Status, Details}` for one check call.
pub fn check_result(result: &InvocationResult) -> CheckResult {
    match result {
        InvocationResult::Success { completion, .. } => CheckResult {
            status: CheckStatus::Success,
            details: completion.clone(),
        },
        InvocationResult::Failure { message, .. } => CheckResult {
            status: CheckStatus::Failed,
            details: message.clone(),
        },
    }
}
