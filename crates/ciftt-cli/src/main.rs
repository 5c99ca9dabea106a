mod cmd;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ciftt",
    about = "C.I.F.T.T. - CSV Input for Feature Triage and Tracking: create or update GitHub issues from CSV/TSV rows",
    version
)]
struct Cli {
    /// Path to the CSV/TSV file containing issue data
    data_file: PathBuf,

    /// GitHub repository in format 'owner/repo'
    repo: String,

    /// Print actions without executing them
    #[arg(long, short = 'd')]
    dry_run: bool,

    /// Field delimiter: a single character or 'tab' (default: by extension, then sniffed)
    #[arg(long)]
    delimiter: Option<String>,

    /// Env file to read GITHUB_TOKEN / GITHUB_API_URL from
    #[arg(long, default_value = ciftt_core::settings::DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Output the final report as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = cmd::sync::SyncArgs {
        data_file: cli.data_file,
        repo: cli.repo,
        dry_run: cli.dry_run,
        delimiter: cli.delimiter,
        env_file: cli.env_file,
    };

    if let Err(e) = cmd::sync::run(args, cli.json) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
