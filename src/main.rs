//! launchdeck - a terminal console for application workloads on Kubernetes
//!
//! Lists Deployments and StatefulSets with live CPU and memory utilisation,
//! polling metrics only for the rows on screen.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launchdeck::cli::{self, ConfigSubcommand, LogTarget};
use launchdeck::config::{Config, ConfigLoader};
use launchdeck::sync::{LifecycleAction, SyncSettings};
use launchdeck::WorkloadBackend;
use std::sync::Arc;

/// launchdeck - a terminal console for application workloads on Kubernetes
#[derive(Parser, Debug)]
#[command(name = "launchdeck")]
#[command(about = "A terminal console for monitoring application workloads on Kubernetes", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Namespace to start in
    #[arg(long, short = 'n', global = true)]
    namespace: Option<String>,

    /// Restore a saved location (e.g. "namespace=team&page=2&pageSize=20")
    #[arg(long, global = true)]
    location: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of workloads with current utilisation
    List {
        /// Use ASCII instead of block characters for charts
        #[arg(long)]
        ascii: bool,
    },
    /// Scale a workload to zero, remembering its replicas
    Pause { name: String },
    /// Restore a paused workload
    Start { name: String },
    /// Rolling restart of a workload
    Restart { name: String },
    /// Delete a workload
    Delete { name: String },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let context = launchdeck::kube::get_context();

    let command = match args.command {
        Some(Command::Config { subcommand }) => {
            return cli::handle_config_command(subcommand, context.as_deref());
        }
        Some(Command::Version) => {
            cli::display_version();
            return Ok(());
        }
        other => other,
    };

    let target = if command.is_some() {
        LogTarget::Headless
    } else {
        LogTarget::Tui
    };
    let log_file = cli::init_logging(args.debug, target)?;
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let config = ConfigLoader::load(context.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    tracing::debug!(
        "Configuration loaded: readOnly={}, context={:?}",
        config.read_only,
        context
    );

    let namespace = launchdeck::kube::resolve_namespace(
        args.namespace.as_deref(),
        launchdeck::kube::context_namespace(),
        &config.default_namespace,
    );

    tracing::debug!("Initializing Kubernetes client");
    let client = launchdeck::kube::create_client().await?;
    let backend: Arc<dyn WorkloadBackend> = Arc::new(cli::build_backend(client, &config)?);

    let settings = SyncSettings::from(&config.sync);
    let pagination = cli::initial_pagination(
        args.location.as_deref(),
        &namespace,
        config.sync.default_page_size,
    );

    match command {
        Some(Command::List { ascii }) => {
            let ascii = ascii || config.ui.no_icons;
            let table = cli::list_command(backend, pagination, &settings, ascii).await?;
            print!("{}", table);
            Ok(())
        }
        Some(Command::Pause { name }) => {
            run_lifecycle(&backend, &config, LifecycleAction::Pause, &namespace, &name).await
        }
        Some(Command::Start { name }) => {
            run_lifecycle(&backend, &config, LifecycleAction::Start, &namespace, &name).await
        }
        Some(Command::Restart { name }) => {
            run_lifecycle(&backend, &config, LifecycleAction::Restart, &namespace, &name).await
        }
        Some(Command::Delete { name }) => {
            run_lifecycle(&backend, &config, LifecycleAction::Delete, &namespace, &name).await
        }
        Some(Command::Config { .. }) | Some(Command::Version) => Ok(()),
        None => run_interactive(backend, settings, pagination, context, &config).await,
    }
}

async fn run_lifecycle(
    backend: &Arc<dyn WorkloadBackend>,
    config: &Config,
    action: LifecycleAction,
    namespace: &str,
    name: &str,
) -> Result<()> {
    cli::lifecycle_command(backend.as_ref(), action, namespace, name, config.read_only).await?;
    println!("{} {}/{}: ok", action.verb(), namespace, name);
    Ok(())
}

#[cfg(feature = "tui")]
async fn run_interactive(
    backend: Arc<dyn WorkloadBackend>,
    settings: SyncSettings,
    pagination: launchdeck::PaginationState,
    context: Option<String>,
    config: &Config,
) -> Result<()> {
    use launchdeck::tui::{TuiOptions, run_tui};

    let handle = launchdeck::AppListSynchronizer::start(backend, settings, pagination);
    let options = TuiOptions {
        context,
        read_only: config.read_only,
        enable_mouse: config.ui.enable_mouse,
        no_icons: config.ui.no_icons,
    };
    run_tui(handle, options).await
}

#[cfg(not(feature = "tui"))]
async fn run_interactive(
    _backend: Arc<dyn WorkloadBackend>,
    _settings: SyncSettings,
    _pagination: launchdeck::PaginationState,
    _context: Option<String>,
    _config: &Config,
) -> Result<()> {
    anyhow::bail!("launchdeck was built without the \"tui\" feature; use `launchdeck list`")
}
