use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shopintel_core::{BulkJob, Target};
use shopintel_orchestrator::{BulkSummary, ExtractOptions, Mode, Orchestrator};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopintel")]
#[command(about = "Extract brand insights from Shopify storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract insights for one storefront
    Single {
        #[arg(value_parser = parse_target)]
        url: Target,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Extract a storefront and its competitors
    Competitive {
        #[arg(value_parser = parse_target)]
        url: Target,
        /// Competitor storefront; repeat for several. Discovered when omitted.
        #[arg(long = "competitor", value_parser = parse_target)]
        competitors: Vec<Target>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Process many storefronts as a background job
    Bulk {
        #[arg(value_parser = parse_target)]
        urls: Vec<Target>,
        /// File with one storefront URL per line (`#` starts a comment)
        #[arg(long)]
        file: Option<PathBuf>,
        /// How often to log job progress, in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Cap on catalog products per storefront
    #[arg(long)]
    max_products: Option<usize>,
    /// Run free text through the text structurer
    #[arg(long)]
    normalize: bool,
}

impl RunArgs {
    fn options(&self, competitor_urls: Option<Vec<Target>>) -> ExtractOptions {
        ExtractOptions {
            competitor_urls,
            max_products: self.max_products,
            enable_normalization: self.normalize,
        }
    }
}

fn parse_target(input: &str) -> Result<Target, String> {
    Target::parse(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shopintel_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let orchestrator = Orchestrator::from_app_config(&config)?;

    match cli.command {
        Commands::Single { url, run } => {
            let output = orchestrator.extract(url, Mode::Single, run.options(None)).await?;
            print_json(&output)?;
        }
        Commands::Competitive {
            url,
            competitors,
            run,
        } => {
            let given = (!competitors.is_empty()).then_some(competitors);
            let output = orchestrator
                .extract(url, Mode::Competitive, run.options(given))
                .await?;
            print_json(&output)?;
        }
        Commands::Bulk {
            mut urls,
            file,
            poll_ms,
            run,
        } => {
            if let Some(path) = file {
                urls.extend(read_target_file(&path)?);
            }
            anyhow::ensure!(!urls.is_empty(), "bulk needs at least one URL or --file");
            run_bulk(&orchestrator, urls, run.options(None), poll_ms).await?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct BulkReport {
    summary: BulkSummary,
    job: BulkJob,
}

async fn run_bulk(
    orchestrator: &Orchestrator,
    targets: Vec<Target>,
    options: ExtractOptions,
    poll_ms: u64,
) -> anyhow::Result<()> {
    let handle = orchestrator.start_bulk(targets, options);
    let mut last_progress = -1.0_f64;
    let wait = orchestrator.wait_for_job(handle.id, Duration::from_millis(poll_ms.max(10)), |job| {
        if job.progress > last_progress {
            last_progress = job.progress;
            let counts = job.counts();
            tracing::info!(
                job_id = %job.id,
                progress_pct = (job.progress * 100.0).round(),
                succeeded = counts.succeeded,
                failed = counts.failed,
                cancelled = counts.cancelled,
                "bulk progress"
            );
        }
    });
    tokio::pin!(wait);

    let job = tokio::select! {
        result = &mut wait => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(job_id = %handle.id, "interrupt received; cancelling pending targets");
            orchestrator.cancel(handle.id)?;
            wait.await?
        }
    };

    print_json(&BulkReport {
        summary: BulkSummary::from_job(&job),
        job,
    })
}

fn read_target_file(path: &Path) -> anyhow::Result<Vec<Target>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_target_lines(&content)
}

fn parse_target_lines(content: &str) -> anyhow::Result<Vec<Target>> {
    content
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.split('#').next().unwrap_or_default().trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(n, line)| Target::parse(line).with_context(|| format!("line {n}")))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests;
