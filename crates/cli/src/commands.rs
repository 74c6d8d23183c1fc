//! Subcommand handlers.

use crate::cli::{InitArgs, InvokeArgs, ProcessArgs, SpaArgs};
use crate::render;
use color_eyre::eyre::{bail, Result, WrapErr};
use colored::Colorize;
use pf_core::agents::{AgentClient, DecodeMode, ProcessRuntime};
use pf_core::config::{load_config, AppConfig, CredentialResolver};
use pf_core::engine::spa::{orchestrate_spa, SpaRequest};
use pf_core::engine::{PaymentPipeline, PipelinePolicy};
use pf_core::history::HistoryLedger;
use pf_core::init::{generate_project_structure, InitOptions};
use pf_core::state::SessionContext;
use pf_protocol::{AgentKind, PaymentRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Project settings plus credentials from the environment.
struct Workspace {
    root: PathBuf,
    config: AppConfig,
    credentials: CredentialResolver,
}

impl Workspace {
    async fn load() -> Result<Self> {
        let root = std::env::current_dir().wrap_err("cannot determine working directory")?;
        let config = load_config(&root).await?;

        let mut credentials = CredentialResolver::from_env();
        if let Some(region) = config.region.as_deref().filter(|r| !r.trim().is_empty()) {
            credentials = credentials.with_region(region);
        }
        debug!(region = credentials.region(), command = config.transport.command_or_default(), "workspace loaded");

        Ok(Self {
            root,
            config,
            credentials,
        })
    }

    fn client(&self, decode: DecodeMode) -> AgentClient {
        let transport = &self.config.transport;
        let runtime = ProcessRuntime::new(transport.command_or_default(), transport.args.clone())
            .with_working_dir(transport.working_dir_in(&self.root));
        AgentClient::new(Arc::new(runtime), self.credentials.clone()).with_decode_mode(decode)
    }
}

async fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("cannot read payload file {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

pub async fn handle_init(args: InitArgs) -> Result<()> {
    let options = InitOptions {
        force: args.force,
        minimal: args.minimal,
        ..Default::default()
    };
    let dir = generate_project_structure(options).await?;

    println!("{} {}", "Created".green(), dir.display());
    println!("Copy {} to .env and fill in the agent ids.", dir.join("env.example").display());
    Ok(())
}

pub async fn handle_agents() -> Result<()> {
    let workspace = Workspace::load().await?;

    println!("{:<22}  {:<22}  {}", "Agent", "Name", "State");
    for agent in AgentKind::ALL {
        println!(
            "{:<22}  {:<22}  {}",
            agent.display_name(),
            agent.logical_name(),
            render::configured_label(workspace.credentials.is_configured(agent))
        );
    }
    println!("Region: {}", workspace.credentials.region());
    Ok(())
}

pub async fn handle_invoke(args: InvokeArgs) -> Result<()> {
    let agent: AgentKind = args.agent.parse()?;
    let body = read_json(&args.payload).await?;

    let workspace = Workspace::load().await?;
    let client = workspace.client(workspace.config.pipeline.decode);
    let region = args.region.unwrap_or_else(|| client.region().to_string());

    info!(agent = agent.logical_name(), %region, "invoking single agent");
    let mut ledger = HistoryLedger::new();
    let result = client.invoke_in_region(agent, &body, &region, &mut ledger).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_invocation(agent, &result);
        println!();
        render::print_history(&ledger);
    }

    if !result.is_success() {
        bail!("{} call failed", agent.display_name());
    }
    Ok(())
}

pub async fn handle_process(args: ProcessArgs) -> Result<()> {
    let payload = read_json(&args.payload).await?;
    let request = PaymentRequest::from_value(payload)?;

    let workspace = Workspace::load().await?;
    let decode = if args.strict_decode {
        DecodeMode::Strict
    } else {
        workspace.config.pipeline.decode
    };
    let mut policy = PipelinePolicy::from(&workspace.config.pipeline);
    policy.halt_on_failed_checks |= args.halt_on_failed_checks;

    let pipeline = PaymentPipeline::new(workspace.client(decode)).with_policy(policy);
    let mut session = SessionContext::new();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let live = !args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if !live {
                continue;
            }
            if let Some(line) = render::event_line(&event) {
                println!("{line}");
            }
        }
    });

    let result = pipeline.run(&mut session, request, &events_tx).await;
    drop(events_tx);
    printer.await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    render::print_result_summary(&result);
    println!();
    render::print_statuses(&result);
    println!();
    render::print_work_log(&session.work_log());
    println!();
    println!("{}", "Enriched payload".bold().underline());
    println!("{}", serde_json::to_string_pretty(&result.enriched_payload)?);
    println!();
    render::print_history(&session.history);
    Ok(())
}

pub async fn handle_spa(args: SpaArgs) -> Result<()> {
    let request = SpaRequest::new(args.bucket_path, args.investor_id)
        .with_document_type(args.document_type)
        .with_collaborator(args.collaborator);

    let workspace = Workspace::load().await?;
    let mut client = workspace.client(workspace.config.pipeline.decode);
    if let Some(region) = args.region {
        client = client.with_region(region);
    }

    info!(investor_id = %request.investor_id, document_type = %request.document_type, "processing document");
    let mut ledger = HistoryLedger::new();
    let result = orchestrate_spa(&client, &request, &mut ledger).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_spa_result(&request, &result);
        println!();
        render::print_history(&ledger);
    }

    if !result.is_success() {
        bail!("document processing failed");
    }
    Ok(())
}
