//! LedgerView Node Binary
//!
//! Answers one ledger query per invocation and prints the result as JSON.

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ledgerview_common::LedgerError;
use ledgerview_ledger::QueryContext;
use ledgerview_node::{
    build_engine, connect_postgres, execute, exit_code, Args, Command, ErrorResponse, NodeConfig,
};

fn init_tracing(config: &NodeConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    // stdout carries results, so logs go to stderr
    let layer = if config.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn apply_overrides(config: &mut NodeConfig, args: &Args) {
    if let Some(path) = &args.fixture {
        config.fixture_path = Some(path.clone());
        config.database_url = None;
    }
    if let Some(url) = &args.database_url {
        config.database_url = Some(url.clone());
        config.fixture_path = None;
    }
    if args.cache {
        config.cache_enabled = true;
    }
    if let Some(ms) = args.timeout_ms {
        config.query_config.query_timeout = Some(std::time::Duration::from_millis(ms));
    }
    if args.log_json {
        config.log_json = true;
    }
}

fn fail(err: &LedgerError) -> i32 {
    match serde_json::to_string(&ErrorResponse::from(err)) {
        Ok(body) => eprintln!("{body}"),
        Err(_) => eprintln!("{err}"),
    }
    exit_code(err)
}

async fn run(config: NodeConfig, command: Command) -> Result<serde_json::Value, LedgerError> {
    if command == Command::InitSchema {
        let store = connect_postgres(&config).await?;
        store.ensure_schema().await?;
        info!("Schema ready");
        return Ok(serde_json::json!({ "schema": "ready" }));
    }

    let engine = build_engine(&config).await?;

    let (ctx, handle) = QueryContext::cancellable();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling query");
            handle.cancel();
        }
    });

    execute(&engine, &ctx, command).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = NodeConfig::from_env();
    apply_overrides(&mut config, &args);
    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        std::process::exit(fail(&LedgerError::ConfigurationError(e)));
    }

    info!(command = ?args.command, "Starting LedgerView query");

    match run(config, args.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => std::process::exit(fail(&e)),
    }
}
