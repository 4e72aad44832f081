use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use workspace_inputs::{Config, GlobOptions, Orchestrator};

#[derive(Debug, Parser)]
struct Cli {
    /// Maximum number of workspaces resolved at once
    #[arg(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Skip dotfiles and dot-directories when expanding globs
    #[arg(long)]
    pub no_dot: bool,

    /// Cache directory, relative to the monorepo root
    #[arg(long)]
    pub cache_directory: Option<PathBuf>,

    /// Path to monorepo root directory
    #[arg(default_value = ".")]
    pub monorepo_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = Config::default().with_glob_options(GlobOptions {
        dot: !cli.no_dot,
        ..GlobOptions::default()
    });
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(cache_directory) = cli.cache_directory {
        config = config.with_cache_directory(cache_directory);
    }

    let started = Instant::now();
    let summary = Orchestrator::new(&cli.monorepo_root, config).run().await?;

    let mut stdout = io::stdout();
    writeln!(stdout, "Updated workspaces: {:?}", summary.updated)?;
    for (workspace, reason) in &summary.failed {
        writeln!(stdout, "Failed to resolve {}: {}", workspace, reason)?;
    }
    writeln!(stdout, "Done in {:.2?}", started.elapsed())?;
    Ok(())
}
