mod commands;
mod context;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "freezer")]
#[command(about = "Freeze idle cloud servers into snapshots and bring them back later", long_about = None)]
struct Cli {
    /// Root directory for server dumps
    #[arg(long, global = true, env = "FREEZER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Target server and credentials
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Name of the server
    #[arg(long)]
    pub server_name: String,

    /// Project the server belongs to
    #[arg(long)]
    pub project: String,

    /// Hetzner Cloud API token
    #[arg(long, env = "HCLOUD_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot a server, release its addresses and delete it
    Freeze(ServerArgs),
    /// Recreate a frozen server from a dump
    Unfreeze {
        #[command(flatten)]
        server: ServerArgs,
        /// Dump to restore (defaults to the latest one)
        #[arg(long)]
        server_dump_id: Option<String>,
    },
    /// Dump a server without shutting it down
    Dump(ServerArgs),
    /// List the dumps recorded for a server
    List {
        /// Name of the server
        #[arg(long)]
        server_name: String,
        /// Project the server belongs to
        #[arg(long)]
        project: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // logs go to stderr, command output to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("freezer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = context::load_settings(cli.output_dir)?;

    match cli.command {
        Commands::Freeze(server) => commands::freeze::handle(&settings, &server).await,
        Commands::Unfreeze {
            server,
            server_dump_id,
        } => commands::unfreeze::handle(&settings, &server, server_dump_id.as_deref()).await,
        Commands::Dump(server) => commands::dump::handle(&settings, &server).await,
        Commands::List {
            server_name,
            project,
        } => commands::list::handle(&settings, &project, &server_name).await,
        Commands::Version => unreachable!("Version is handled before config loading"),
    }
}
