use anyhow::Context;
use clap::Parser;
use portfolio_shell::commands::CommandRegistry;
use portfolio_shell::config;
use portfolio_shell::jobs::{HttpJobService, JobService, SimulatedJobService};
use portfolio_shell::logging;
use portfolio_shell::navigation::LogNavigator;
use portfolio_shell::repl;
use portfolio_shell::session::{FileSnapshotStore, SnapshotStore};
use portfolio_shell::vfs::{default_tree, FileTree};
use portfolio_shell::{Terminal, TerminalServices};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "portfolio-shell", about = "Interactive portfolio terminal")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file tree to browse instead of the built-in content
    #[arg(long)]
    content: Option<PathBuf>,

    /// Session snapshot file; overrides session.snapshot_path
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;

    let tree = match &args.content {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            FileTree::from_json(&raw)
                .with_context(|| format!("invalid content tree in {}", path.display()))?
        }
        None => default_tree(),
    };

    let jobs: Arc<dyn JobService> = match &config.jobs.service_url {
        Some(url) => Arc::new(HttpJobService::new(url.as_str())?),
        None => Arc::new(SimulatedJobService::default()),
    };

    let snapshots = args
        .snapshot
        .or_else(|| config.session.snapshot_path.clone())
        .map(|path| Arc::new(FileSnapshotStore::new(path)) as Arc<dyn SnapshotStore>);

    let terminal = Terminal::open(
        Arc::new(CommandRegistry::with_builtins()),
        &config,
        tree,
        TerminalServices {
            jobs,
            navigator: Arc::new(LogNavigator),
            snapshots,
        },
    )?;

    repl::run(terminal).await?;
    Ok(())
}
