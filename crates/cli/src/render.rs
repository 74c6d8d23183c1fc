//! Terminal rendering for results, statuses, work log and history.

use colored::{ColoredString, Colorize};
use pf_core::engine::spa::SpaRequest;
use pf_core::history::HistoryLedger;
use pf_protocol::{
    AgentKind, AgentState, AgentStatus, Event, HistoryStatus, InvocationResult, PipelineResult,
    PipelineStep, StepLogLine,
};

pub fn state_label(state: AgentState) -> ColoredString {
    match state {
        AgentState::Pending => "pending".dimmed(),
        AgentState::Running => "running".yellow(),
        AgentState::Success => "success".green(),
        AgentState::Error => "error".red(),
    }
}

pub fn configured_label(configured: bool) -> ColoredString {
    if configured {
        "configured".green()
    } else {
        "not configured".red()
    }
}

/// One line for a live event, or `None` for events not worth printing.
pub fn event_line(event: &Event) -> Option<String> {
    match event {
        Event::StepStarted {
            step, step_index, ..
        } => Some(format!(
            "{} {}",
            format!("[{}/{}]", step_index + 1, PipelineStep::COUNT).bold(),
            step.label()
        )),
        Event::AgentStatusChanged { agent, state, .. } if *state != AgentState::Pending => {
            Some(format!("      {} {}", agent.display_name(), state_label(*state)))
        }
        Event::StepLogAppended { message, .. } => Some(format!("      {}", message.dimmed())),
        _ => None,
    }
}

pub fn print_statuses(result: &PipelineResult) {
    println!("{}", "Agent status".bold().underline());
    for agent in AgentKind::ALL {
        let status = result.status(agent).cloned().unwrap_or_default();
        println!(
            "  {:<22} {}",
            agent.display_name(),
            state_label(status.state)
        );
        print_status_detail(&status);
    }
}

fn print_status_detail(status: &AgentStatus) {
    if let Some(error) = &status.error {
        println!("  {:<22} {}", "", error.red());
    } else if let Some(response) = &status.response {
        println!("  {:<22} {}", "", response.text());
    }
}

pub fn print_work_log(lines: &[StepLogLine]) {
    println!("{}", "Work log".bold().underline());
    let mut current = None;
    for line in lines {
        if current != Some(line.step) {
            println!("  {}", line.label.bold());
            current = Some(line.step);
        }
        println!("    {}", line.formatted());
    }
}

pub fn print_history(history: &HistoryLedger) {
    println!("{}", "History".bold().underline());
    if history.is_empty() {
        println!("  {}", "(empty)".dimmed());
        return;
    }

    println!(
        "  {:<19}  {:<22}  {:<14}  {:<8}  {:<6}  {}",
        "Timestamp", "Agent", "Merchant", "Amount", "Status", "Session"
    );
    for entry in history.iter().rev() {
        let summary = entry.summary();
        let status = match entry.status {
            HistoryStatus::Success => "ok".green(),
            HistoryStatus::Failed => "failed".red(),
        };
        println!(
            "  {:<19}  {:<22}  {:<14}  {:<8}  {:<6}  {}",
            entry.formatted_timestamp(),
            entry.agent_display_name(),
            summary.merchant_id,
            summary.amount,
            status,
            entry.session_id.dimmed()
        );
    }
}

pub fn print_invocation(agent: AgentKind, result: &InvocationResult) {
    print_outcome(agent.display_name(), result);
}

pub fn print_spa_result(request: &SpaRequest, result: &InvocationResult) {
    println!(
        "Document {} ({}) for investor {}",
        request.bucket_path, request.document_type, request.investor_id
    );
    println!("  Collaborator: {}", request.collaborator);
    print_outcome("SPA processing", result);
}

fn print_outcome(title: &str, result: &InvocationResult) {
    match result {
        InvocationResult::Success {
            completion,
            trace,
            session_id,
        } => {
            println!("{} {}", title.bold(), "succeeded".green());
            println!("  Session: {}", session_id);
            println!("  Response: {}", completion);
            if let Some(trace) = trace {
                let text = serde_json::to_string_pretty(trace).unwrap_or_default();
                println!("  Trace:\n{}", text);
            }
        }
        InvocationResult::Failure { kind, message } => {
            println!(
                "{} {} ({:?})",
                title.bold(),
                "failed".red(),
                kind
            );
            println!("  {}", message);
        }
    }
}

pub fn print_result_summary(result: &PipelineResult) {
    let checks = if result.all_checks_pass() {
        "all checks passed".green()
    } else {
        "checks failed".red()
    };
    let outcome = if result.orchestrator_succeeded() {
        "payment orchestrated".green()
    } else if result.halted {
        "halted before orchestration".yellow()
    } else {
        "orchestrator failed".red()
    };
    println!("Run {}: {}, {}", result.run_id, checks, outcome);
}
