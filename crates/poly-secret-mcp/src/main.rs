use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use poly_secret_core::config::{load_config, CONFIG_ENV_VAR};
use poly_secret_core::logging::{ConsoleLogger, FileLogger, LogLevel, SharedLogger, TeeLogger};
use poly_secret_core::{log_info, log_warn, AdapterFactory, Runtime};
use rmcp::ServiceExt;

#[derive(Debug, Parser)]
#[command(
    name = "poly-secret-mcp",
    version,
    about = "Unified MCP server in front of several secret backends (stdio)"
)]
struct Args {
    /// Config file; otherwise the workspace file, then the user file.
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Workspace root searched for `.config/poly-secret/config.yaml`.
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Also append diagnostics to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Minimum diagnostic level: debug, info, warn or error.
    #[arg(long, env = "POLY_SECRET_LOG_LEVEL", value_parser = parse_level, default_value = "info")]
    log_level: LogLevel,

    /// Print the resolved configuration as YAML and exit.
    #[arg(long)]
    print_config: bool,

    /// List the supported adapter kinds and exit.
    #[arg(long)]
    list_kinds: bool,
}

fn parse_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level '{}'", value))
}

fn build_logger(level: LogLevel, log_file: Option<&PathBuf>) -> anyhow::Result<SharedLogger> {
    let console: SharedLogger = Arc::new(ConsoleLogger::new().with_min_level(level));
    let Some(path) = log_file else {
        return Ok(console);
    };
    let file: SharedLogger = Arc::new(
        FileLogger::open(path)
            .with_context(|| format!("open log file {}", path.display()))?
            .with_min_level(level),
    );
    Ok(Arc::new(TeeLogger::new(vec![console, file])))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_kinds {
        for (kind, description) in AdapterFactory::list_kinds() {
            println!("{:<10} {}", kind, description);
        }
        return Ok(());
    }

    let workspace = match args.workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let (config, source) = load_config(args.config, &workspace)
        .await
        .context("load configuration")?;

    if args.print_config {
        print!("{}", config.to_yaml().context("serialize configuration")?);
        return Ok(());
    }

    let log_file = args.log_file.or_else(|| config.server.log_file.clone());
    let logger = build_logger(args.log_level, log_file.as_ref())?;

    match &source {
        Some(path) => log_info!(logger, "[main] Using config {}", path.display()),
        None => log_info!(logger, "[main] No config file found, using built-in defaults"),
    }

    let mut runtime = Runtime::from_config(&config, Arc::clone(&logger))
        .await
        .context("build adapters")?;
    eprintln!("{}", runtime.banner());

    let served = serve(&runtime, &logger).await;

    for failure in runtime.shutdown().await {
        log_warn!(logger, "[main] '{}' did not disconnect cleanly: {}", failure.adapter, failure.message);
    }
    served
}

/// Serve MCP over stdio until the client goes away or Ctrl-C
async fn serve(runtime: &Runtime, logger: &SharedLogger) -> anyhow::Result<()> {
    let running = runtime
        .server()
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP transport on stdio")?;

    tokio::select! {
        quit = running.waiting() => {
            match quit {
                Ok(reason) => log_info!(logger, "[main] Session ended: {:?}", reason),
                Err(e) => log_warn!(logger, "[main] Session task failed: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log_info!(logger, "[main] Interrupted, shutting down");
        }
    }
    Ok(())
}
