use anyhow::Context;
use ciftt_core::{
    client::GitHubClient,
    repo::RepoRef,
    settings::Settings,
    sync::{sync_table, Mode},
    table, CifttError,
};
use std::path::PathBuf;

pub struct SyncArgs {
    pub data_file: PathBuf,
    pub repo: String,
    pub dry_run: bool,
    pub delimiter: Option<String>,
    pub env_file: PathBuf,
}

pub fn run(args: SyncArgs, json: bool) -> anyhow::Result<()> {
    let repo = RepoRef::parse(&args.repo)?;
    let delimiter = args.delimiter.as_deref().map(parse_delimiter).transpose()?;

    let settings = Settings::load(&args.env_file)
        .with_context(|| format!("failed to load settings from '{}'", args.env_file.display()))?;
    let client = GitHubClient::new(&settings)?;

    if !json {
        println!("Reading data file: {}", args.data_file.display());
        println!("Target repository: {repo}");
        if args.dry_run {
            println!("DRY RUN: no changes will be made on GitHub");
        }
    }

    let table = table::load(&args.data_file, delimiter)?;
    tracing::info!(rows = table.len(), "loaded data file");

    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        Mode::Live(&client)
    };
    let report = sync_table(&table, &repo, mode, |outcome| {
        if !json {
            println!("{outcome}");
        }
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("Summary: {}", report.summary());
    }
    Ok(())
}

fn parse_delimiter(s: &str) -> Result<u8, CifttError> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(CifttError::InvalidDelimiter(s.to_string())),
    }
}
