//! CLI entry point.

use std::{path::PathBuf, sync::Arc};

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand, parser::ValueSource};
use eyre::{Result, WrapErr, eyre};
use tracing::info;
use vesta_discovery::{Discovery, DiscoveryArgs};
use vesta_node_core::{
    VERSION,
    args::LogArgs,
    config::VestaConfig,
    logging,
    metrics::{METRICS_PREFIX, install_recorder},
};

use crate::{commands, snapshot::Snapshot};

/// Vesta - storage provider discovery over a permission-layered DHT
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Discovery configuration.
    #[command(flatten)]
    pub(crate) discovery: DiscoveryArgs,

    /// Path to a TOML configuration file.
    #[arg(long, global = true, env = "VESTA_CONFIG", value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Path to a captured marketplace snapshot (TOML).
    #[arg(long, global = true, env = "VESTA_SNAPSHOT", value_name = "PATH")]
    pub(crate) snapshot: Option<PathBuf>,

    /// Print discovery metrics in the prometheus text format to stderr on exit.
    #[arg(long, global = true)]
    pub(crate) metrics: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Show marketplace price statistics and this SP's standing.
    Info {
        /// Wallet address of this SP (overrides `own_address` from config).
        #[arg(long)]
        address: Option<String>,
    },
    /// List the addressable storage providers of a layer.
    Profiles {
        /// Permission layer to inspect.
        #[arg(long, default_value = "eth")]
        layer: String,
    },
    /// Print the merged download URLs of a shard.
    Urls {
        /// Shard key.
        shard: String,
    },
    /// Announce that this node stores a shard.
    Announce {
        /// Shard key.
        shard: String,
        /// Permission layer identifier (e.g. eth, neo, none).
        layer: String,
    },
}

/// Whether the argument `id` was given on the command line.
fn given_on_cli(matches: &ArgMatches, id: &str) -> bool {
    matches!(matches.value_source(id), Some(ValueSource::CommandLine))
}

/// Parse arguments, initialize logging and configuration, and dispatch.
pub(crate) async fn run() -> Result<()> {
    color_eyre::install()?;

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    logging::init_logging(&cli.logs)?;
    info!("Starting vesta {VERSION}");

    let metrics = cli.metrics.then(|| install_recorder(METRICS_PREFIX)).transpose()?;

    let mut config = VestaConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli.discovery, |id| given_on_cli(&matches, id));

    let path = cli
        .snapshot
        .as_deref()
        .ok_or_else(|| eyre!("no snapshot given, pass --snapshot <PATH> or set VESTA_SNAPSHOT"))?;
    let snapshot = Arc::new(
        Snapshot::load(path)
            .wrap_err_with(|| format!("failed to load snapshot {}", path.display()))?,
    );
    let discovery = Discovery::from_arcs(snapshot.clone(), snapshot.clone(), snapshot)
        .with_config(config.discovery.clone());

    let output = match cli.command {
        Commands::Info { address } => {
            let address = address.or(config.own_address);
            commands::info(&discovery, address).await?
        }
        Commands::Profiles { layer } => commands::profiles(&discovery, &layer).await?,
        Commands::Urls { shard } => commands::urls(&discovery, shard).await,
        Commands::Announce { shard, layer } => commands::announce(&discovery, shard, &layer).await?,
    };

    print!("{output}");
    if let Some(handle) = metrics {
        eprint!("{}", handle.render());
    }
    Ok(())
}
