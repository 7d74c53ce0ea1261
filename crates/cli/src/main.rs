mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use momentx_api::RpcLedgerClient;
use momentx_engine::{
    DemoWorkflowRunner, Identities, StateQuery, StateSnapshot, StepResult, StepStatus, WorkflowReport, WorkflowSettings,
    interaction_plan,
};
use momentx_types::{LedgerAddress, ObjectId, PublishResult};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_MODULE_PATH, DemoConfig, LedgerArgs, load_identities, load_modules, validate_gas_budget};

#[derive(Debug, Parser)]
#[command(name = "momentx", version, about = "Publish the MomentX NFT module and walk its merchant redemption flow")]
struct Cli {
    #[command(flatten)]
    ledger: LedgerArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fund, publish, run the interaction sequence, then query the final state (default).
    Run(RunArgs),
    /// Print the interaction sequence without contacting the ledger.
    Plan,
    /// Query the state of an existing deployment.
    Query(QueryArgs),
    /// Print the addresses derived from the configured seeds.
    Addresses,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Skip the state queries after the workflow completes.
    #[arg(long)]
    skip_queries: bool,

    /// Compiled module bytecode to publish; repeat for multi-module packages.
    #[arg(long = "module", value_name = "PATH", default_value = DEFAULT_MODULE_PATH)]
    modules: Vec<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            skip_queries: false,
            modules: vec![PathBuf::from(DEFAULT_MODULE_PATH)],
        }
    }
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Package id of the published module.
    #[arg(long)]
    package: ObjectId,

    /// Shared global object created when the module was published.
    #[arg(long)]
    global: ObjectId,

    /// Address whose tokens are listed; defaults to the user identity.
    #[arg(long)]
    owner: Option<LedgerAddress>,
}

/// Final output of `run`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoReport {
    workflow: WorkflowReport,
    state: Option<StateSnapshot>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    // A missing .env file is fine; flags and the real environment still apply.
    if let Err(error) = dotenvy::dotenv()
        && !error.not_found()
    {
        return Err(error).context("loading .env");
    }
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run_demo(&cli.ledger, args).await,
        Command::Plan => print_plan(&cli.ledger),
        Command::Query(args) => run_queries(&cli.ledger, args).await,
        Command::Addresses => print_addresses(&cli.ledger),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_demo(ledger: &LedgerArgs, args: RunArgs) -> Result<()> {
    let config = DemoConfig::from_args(ledger)?;
    let modules = load_modules(&args.modules)?;
    let client = RpcLedgerClient::new(config.rpc_url.as_str(), config.faucet_url.as_ref().map(|url| url.as_str()))?;
    log_addresses(&config.identities);

    let mut runner = DemoWorkflowRunner::new(&client, &config.identities, config.settings()).with_observer(log_step);
    let workflow = runner.run(&modules, client.has_faucet()).await.inspect_err(|failure| {
        error!(step = failure.failed_step().unwrap_or("-"), error = %failure, "demo workflow failed");
    })?;
    info!(
        module_id = %workflow.publish.module_id,
        global_object_id = %workflow.publish.global_object_id,
        "demo workflow completed"
    );

    let state = if args.skip_queries {
        None
    } else {
        let snapshot = StateQuery::new(&client)
            .collect(&workflow.publish, config.identities.user.address(), runner.settings())
            .await?;
        Some(snapshot)
    };

    print_json(&DemoReport { workflow, state })
}

async fn run_queries(ledger: &LedgerArgs, args: QueryArgs) -> Result<()> {
    let config = DemoConfig::from_args(ledger)?;
    let client = RpcLedgerClient::new(config.rpc_url.as_str(), config.faucet_url.as_ref().map(|url| url.as_str()))?;
    let publish = PublishResult {
        module_id: args.package,
        global_object_id: args.global,
    };
    let owner = args.owner.unwrap_or_else(|| config.identities.user.address());
    let snapshot = StateQuery::new(&client).collect(&publish, owner, &config.settings()).await?;
    print_json(&snapshot)
}

fn print_plan(ledger: &LedgerArgs) -> Result<()> {
    let settings = WorkflowSettings {
        gas_budget: validate_gas_budget(ledger.gas_budget)?,
        ..WorkflowSettings::default()
    };
    print_json(&interaction_plan(&settings))
}

fn print_addresses(ledger: &LedgerArgs) -> Result<()> {
    let identities = load_identities(ledger)?;
    print_json(&identities.addresses())
}

fn log_addresses(identities: &Identities) {
    for (role, address) in identities.addresses() {
        info!(%role, %address, "identity");
    }
}

fn log_step(result: &StepResult) {
    match result.status {
        StepStatus::Succeeded => info!(
            step = %result.name,
            actor = %result.actor,
            extracted = ?result.extracted_id.as_ref().map(ObjectId::as_str),
            duration_ms = result.duration_ms,
            "step result"
        ),
        StepStatus::Failed => error!(
            step = %result.name,
            actor = %result.actor,
            error = result.error.as_deref().unwrap_or("unknown"),
            "step result"
        ),
    }
    if let Some(response) = &result.response {
        info!(step = %result.name, response = %response.raw, "step response");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialising output")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_modules() {
        let cli = Cli::try_parse_from(["momentx", "run", "--module", "a.mv", "--module", "b.mv", "--skip-queries"]).unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.skip_queries);
        assert_eq!(args.modules, vec![PathBuf::from("a.mv"), PathBuf::from("b.mv")]);
    }

    #[test]
    fn query_parses_identifiers() {
        let cli = Cli::try_parse_from(["momentx", "query", "--package", "0xAA", "--global", "0xbb"]).unwrap();
        let Some(Command::Query(args)) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.package.as_str(), "0x00000000000000000000000000000000000000aa");
        assert_eq!(args.global, ObjectId::parse("0xbb").unwrap());
        assert!(args.owner.is_none());
    }

    #[test]
    fn query_rejects_non_hex_package() {
        assert!(Cli::try_parse_from(["momentx", "query", "--package", "xyz", "--global", "0xbb"]).is_err());
    }
}
