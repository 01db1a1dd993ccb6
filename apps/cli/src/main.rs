#![warn(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ipcheck::ingest::parse_targets;
use ipcheck::report::{Report, ReportFilter, to_csv, to_json};
use ipcheck::service::ResultRow;
use ipcheck::{BatchProgress, CheckService, ConfigError, EchoCapability, ProbePolicy};
use logger::init_tracing;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod args;
mod table;

use args::{CheckArgs, Cli, Command, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => check(cli.config.as_deref(), args).await,
        Command::Config => {
            let policy = load_policy(cli.config.as_deref(), None)?;
            println!("{policy}");
            Ok(())
        }
    }
}

async fn check(config: Option<&Path>, args: CheckArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let targets = parse_targets(&text);
    if targets.is_empty() {
        bail!("{} holds no usable `address,name,groupA,groupB` lines", args.file.display());
    }

    let policy = load_policy(config, args.concurrency)?;

    let capability = EchoCapability::detect(&policy).await;
    let service = CheckService::from_policy(policy, capability);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, remaining hosts will be reported as errors");
                cancel.cancel();
            }
        }
    });

    let (progress_tx, mut progress_rx) = mpsc::channel::<BatchProgress>(8);
    let progress = tokio::spawn(async move {
        while let Some(BatchProgress { completed, total }) = progress_rx.recv().await {
            info!("Checked {completed}/{total} hosts");
        }
    });

    let results = service.check_targets(targets, Some(progress_tx), cancel).await?;
    // Sender is gone once the batch returns
    let _ = progress.await;

    let report = Report::new(results.into_iter().map(ResultRow::from).collect());
    let filter = ReportFilter::from(args.filter);
    let rendered = render(&report, &filter, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn load_policy(config: Option<&Path>, concurrency: Option<usize>) -> Result<ProbePolicy> {
    let policy = match ProbePolicy::from_config(config) {
        Ok(policy) => policy,
        Err(ConfigError::PathUnavailable) => {
            warn!("No config directory available, using the default probe policy");
            ProbePolicy::default()
        }
        Err(error) => return Err(error).context("failed to load probe policy"),
    };

    let Some(concurrency) = concurrency else {
        return Ok(policy);
    };
    let policy = policy.with_concurrency(concurrency);
    policy.validate().context("invalid --concurrency")?;
    Ok(policy)
}

fn render(report: &Report, filter: &ReportFilter, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => table::render(report, filter),
        OutputFormat::Csv => to_csv(report, filter),
        OutputFormat::Json => serde_json::to_string_pretty(&to_json(report, filter))? + "\n",
    })
}
