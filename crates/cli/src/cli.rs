use clap::{Args, Parser, Subcommand};
use pf_protocol::{SpaDocumentType, DEFAULT_COLLABORATOR_AGENT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "payflow", version, about = "Payment orchestration across validator, sanction and orchestrator agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create `.payflow/` with config, env template and a sample payload
    Init(InitArgs),
    /// Show which agents have credentials configured
    Agents,
    /// Invoke a single agent with a JSON payload
    Invoke(InvokeArgs),
    /// Run the full payment pipeline on a payment request
    Process(ProcessArgs),
    /// Have the orchestrator process a structured product agreement
    Spa(SpaArgs),
}

#[derive(Args, Clone)]
pub struct InitArgs {
    /// Overwrite an existing `.payflow/`
    #[arg(long)]
    pub force: bool,

    /// Skip the sample payloads
    #[arg(long)]
    pub minimal: bool,
}

#[derive(Args, Clone)]
pub struct InvokeArgs {
    /// Logical agent name: payment_orchestrator, payment_validator, sanction_check
    #[arg(short, long)]
    pub agent: String,

    /// JSON file sent as the request body
    #[arg(short, long)]
    pub payload: PathBuf,

    /// Region to address instead of the configured one
    #[arg(long)]
    pub region: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ProcessArgs {
    /// Payment request JSON file
    #[arg(short, long)]
    pub payload: PathBuf,

    /// Skip the orchestrator when validation or sanction checks fail
    #[arg(long)]
    pub halt_on_failed_checks: bool,

    /// Fail calls whose completion chunks are empty or not UTF-8
    #[arg(long)]
    pub strict_decode: bool,

    /// Print the final result as JSON instead of the report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct SpaArgs {
    /// Bucket path of the document, e.g. s3://bucket/docs/agreement.pdf
    #[arg(long)]
    pub bucket_path: String,

    /// Investor the document belongs to
    #[arg(long)]
    pub investor_id: String,

    /// spa, term_sheet, prospectus or other
    #[arg(long, default_value = "spa")]
    pub document_type: SpaDocumentType,

    /// Collaborator agent the orchestrator works with
    #[arg(long, default_value = DEFAULT_COLLABORATOR_AGENT)]
    pub collaborator: String,

    /// Region to address instead of the configured one
    #[arg(long)]
    pub region: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
