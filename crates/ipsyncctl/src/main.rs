// # ipsyncctl - IPSync terminal client
//
// A THIN presentation layer over `ipsync-core`: it reads configuration,
// wires the file config store and the HTTP gateway into the controller,
// runs one command and renders the resulting state. No sync logic lives here.
//
// ## Configuration
//
// Every global flag can also be set from the environment:
//
// - `IPSYNC_CONFIG_PATH`: Where the endpoint is persisted
//   (default: `<config dir>/ipsync/config.json`)
// - `IPSYNC_HTTP_TIMEOUT_SECS`: Request timeout, 1..=300 (default: 30)
// - `IPSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// ## Example
//
// ```bash
// ipsyncctl setup 10.0.0.5:7777
// ipsyncctl status
// ipsyncctl sync
// ```

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ipsync_core::{ControllerState, FileConfigStore, StatusSyncController};
use ipsync_gateway_http::{HttpGatewayConfig, HttpGatewayFactory};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different outcomes
///
/// - 0: Command succeeded
/// - 1: Configuration error (missing/invalid endpoint, bad flags)
/// - 2: The remote service rejected a request or could not be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    Success = 0,
    ConfigError = 1,
    RemoteError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "ipsyncctl", version, about = "Check and trigger IPSync domain synchronization")]
struct Cli {
    /// Path of the persisted endpoint file
    #[arg(long, env = "IPSYNC_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "IPSYNC_HTTP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "IPSYNC_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Set the service endpoint (scheme and trailing slash are added if missing)
    Setup {
        /// Host, optionally with scheme, port and path, e.g. 10.0.0.5:7777
        url: String,
    },
    /// Print the configured endpoint
    Endpoint,
    /// Fetch and show the status of every domain
    Status,
    /// Ask the service to re-sync every domain, then show the new status
    Sync,
    /// Forget the configured endpoint
    Reset,
}

/// Validated runtime configuration
#[derive(Debug)]
struct Config {
    config_path: PathBuf,
    timeout: Duration,
    log_level: Level,
}

impl Config {
    fn from_cli(cli: &Cli) -> Result<Self> {
        if !(1..=300).contains(&cli.timeout_secs) {
            anyhow::bail!(
                "IPSYNC_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                cli.timeout_secs
            );
        }

        let log_level = match cli.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "IPSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let config_path = match &cli.config {
            Some(path) if path.as_os_str().is_empty() => {
                anyhow::bail!("IPSYNC_CONFIG_PATH cannot be empty")
            }
            Some(path) => path.clone(),
            None => dirs::config_dir()
                .context(
                    "No config directory on this platform. \
                    Set it via: export IPSYNC_CONFIG_PATH=/path/to/config.json",
                )?
                .join("ipsync")
                .join("config.json"),
        };

        Ok(Self {
            config_path,
            timeout: Duration::from_secs(cli.timeout_secs),
            log_level,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli.command, config).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {:#}", e);
                SyncExitCode::ConfigError
            }
        }
    });

    code.into()
}

/// Run one command against a freshly constructed controller
async fn run(command: Command, config: Config) -> Result<SyncExitCode> {
    debug!("Using config file {}", config.config_path.display());

    let store = FileConfigStore::new(&config.config_path)
        .await
        .context("failed to open config store")?;
    let factory = HttpGatewayFactory::new(HttpGatewayConfig {
        timeout: config.timeout,
        ..Default::default()
    })?;
    let controller = StatusSyncController::new(Arc::new(store), Arc::new(factory)).await;

    match command {
        Command::Setup { url } => setup(&controller, &url).await,
        Command::Endpoint => {
            let endpoint = controller.endpoint();
            if endpoint.is_empty() {
                println!("(not configured)");
                Ok(SyncExitCode::ConfigError)
            } else {
                println!("{}", endpoint);
                Ok(SyncExitCode::Success)
            }
        }
        Command::Status => {
            if !require_configured(&controller) {
                return Ok(SyncExitCode::ConfigError);
            }
            // The controller started a refresh on construction
            settle(&controller).await?;
            Ok(report(&controller))
        }
        Command::Sync => {
            if !require_configured(&controller) {
                return Ok(SyncExitCode::ConfigError);
            }
            settle(&controller).await?;
            if let Some(sync) = controller.trigger_sync() {
                sync.await.context("sync task failed")?;
                println!("Sync triggered");
            }
            Ok(report(&controller))
        }
        Command::Reset => {
            controller.clear_endpoint().await;
            match controller.state().error {
                Some(message) => {
                    eprintln!("error: {}", message);
                    Ok(SyncExitCode::ConfigError)
                }
                None => {
                    println!("Endpoint cleared");
                    Ok(SyncExitCode::Success)
                }
            }
        }
    }
}

/// Point the controller at `url` and report the first refresh
async fn setup(controller: &StatusSyncController, url: &str) -> Result<SyncExitCode> {
    if url.trim().is_empty() {
        anyhow::bail!("endpoint must not be blank");
    }
    // The refresh started against the previous endpoint must land first,
    // otherwise its outcome can overwrite the new endpoint's result
    settle(controller).await?;

    if let Some(refresh) = controller.set_endpoint(url).await {
        refresh.await.context("refresh task failed")?;
    }
    println!("Endpoint set to {}", controller.endpoint());
    Ok(report(controller))
}

fn require_configured(controller: &StatusSyncController) -> bool {
    if controller.state().is_configured() {
        return true;
    }
    eprintln!("No endpoint configured. Run: ipsyncctl setup <URL>");
    false
}

/// Wait until no command is in flight
async fn settle(controller: &StatusSyncController) -> Result<()> {
    let mut rx = controller.subscribe();
    rx.wait_for(|state: &ControllerState| !state.is_loading)
        .await
        .context("controller dropped")?;
    Ok(())
}

/// Print the state and pick the exit code from it
fn report(controller: &StatusSyncController) -> SyncExitCode {
    let state = controller.state();
    print!("{}", render::status_table(&state.status_map));

    match state.error {
        None => SyncExitCode::Success,
        Some(message) => {
            eprintln!("error: {}", message);
            if controller.is_bound() {
                SyncExitCode::RemoteError
            } else {
                SyncExitCode::ConfigError
            }
        }
    }
}
