use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use restic_sentinel::Result;
use restic_sentinel::catalog::{ListOptions, ResticCli, SnapshotSource};
use restic_sentinel::config::{self, CheckConfig};
use restic_sentinel::{check, target, timeutil};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assert that recent snapshots exist for the given host:/path targets;
    /// exits non-zero when any target is stale or missing
    Check {
        /// Targets in hostname:/backed/up/path format (falls back to the
        /// config file's target list when omitted)
        host_paths: Vec<String>,
        /// Require each target to have a snapshot no older than this many hours
        #[arg(long)]
        max_age_hours: Option<i64>,
        /// Path to a TOML check definition
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the raw snapshot catalog listing
    List {
        /// Only list snapshots from this host
        #[arg(long)]
        host: Option<String>,
        /// Only list snapshots that include all of these paths
        #[arg(long = "path")]
        paths: Vec<String>,
        /// Only list snapshots that have all of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Only list the latest snapshot for each host and path
        #[arg(long)]
        latest: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.cmd {
        Command::Check {
            host_paths,
            max_age_hours,
            config,
        } => cmd_check(host_paths, max_age_hours, config.as_deref()),
        Command::List {
            host,
            paths,
            tags,
            latest,
        } => cmd_list(host, paths, tags, latest),
    }
}

fn cmd_check(
    host_paths: Vec<String>,
    max_age_hours: Option<i64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let cfg = match config_path {
        Some(p) => config::load(p)?,
        None => CheckConfig::default(),
    };
    let raw_targets = if host_paths.is_empty() {
        cfg.targets.clone()
    } else {
        host_paths
    };
    let targets = target::parse_targets(&raw_targets)?;
    let max_age = max_age_hours.unwrap_or(cfg.max_age_hours);

    let source = ResticCli::new(cfg.restic_binary.as_str());
    let outcome = check::run_check(&source, &targets, max_age, timeutil::naive_utc_now())?;

    println!("{}", outcome.render_report());
    std::process::exit(outcome.exit_code());
}

fn cmd_list(
    host: Option<String>,
    paths: Vec<String>,
    tags: Vec<String>,
    latest: bool,
) -> Result<()> {
    let source = ResticCli::default();
    let opts = ListOptions {
        only_latest: latest,
        host,
        paths,
        tags,
    };
    let snapshots = source.list_snapshots(&opts)?;
    if snapshots.is_empty() {
        println!("no snapshots matched the given filters");
        return Ok(());
    }
    for s in &snapshots {
        println!(
            "{}  {}  {}  {}",
            s.short_id,
            s.time,
            s.hostname,
            s.paths.join(",")
        );
    }
    Ok(())
}
