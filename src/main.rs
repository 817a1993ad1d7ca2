use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heureum::classify::{korean_book_rules, CategoryClassifier};
use heureum::config::Config;
use heureum::export::{read_bestsellers, read_interest, ReportWriter};
use heureum::models::Granularity;
use heureum::pipeline::run_analysis;
use heureum::source::{collect_interest, default_keyword_map, TrendsClient};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "heureum",
    version,
    about = "Korean book market trend correlation: search interest vs bestseller shares",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect search-interest data into an interest CSV
    Collect {
        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Period granularity (monthly, weekly)
        #[arg(short, long)]
        granularity: Option<String>,
    },

    /// Analyze interest and bestseller CSVs into correlation reports
    Analyze {
        /// Interest CSV path (as written by the collect command)
        #[arg(short, long)]
        interest: PathBuf,

        /// Bestseller list CSV path
        #[arg(short, long)]
        bestsellers: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    tracing::info!("heureum starting");

    match cli.command {
        Commands::Collect {
            output,
            granularity,
        } => {
            let granularity = match granularity {
                Some(text) => Granularity::parse(&text)
                    .with_context(|| format!("Unknown granularity: {text}"))?,
                None => config.analysis.granularity,
            };
            tracing::info!(
                output = %output.display(),
                granularity = %granularity,
                "Starting collect command"
            );
            collect(&config, &output, granularity).await?;
        }

        Commands::Analyze {
            interest,
            bestsellers,
            output,
        } => {
            tracing::info!(
                interest = %interest.display(),
                bestsellers = %bestsellers.display(),
                output = %output.display(),
                "Starting analyze command"
            );
            analyze(&config, &interest, &bestsellers, &output)?;
        }
    }

    tracing::info!("heureum completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("heureum=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("heureum=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn collect(config: &Config, output: &PathBuf, granularity: Granularity) -> Result<()> {
    let client = TrendsClient::new(&config.source)?;
    let keyword_map = default_keyword_map();

    let records = collect_interest(&client, &keyword_map, granularity).await;
    tracing::info!(records = records.len(), "Interest collection finished");

    let writer = ReportWriter::new(output)?;
    let path = writer.write_interest(&records)?;
    println!("Wrote {} interest records to {}", records.len(), path.display());

    Ok(())
}

fn analyze(
    config: &Config,
    interest: &PathBuf,
    bestsellers: &PathBuf,
    output: &PathBuf,
) -> Result<()> {
    let records = read_interest(interest)
        .with_context(|| format!("Failed to read interest CSV: {}", interest.display()))?;
    let entries = read_bestsellers(bestsellers)
        .with_context(|| format!("Failed to read bestseller CSV: {}", bestsellers.display()))?;

    let classifier = CategoryClassifier::new(&korean_book_rules())?;
    let report = run_analysis(&records, &entries, &classifier, &config.analysis);

    let writer = ReportWriter::new(output)?;
    writer.write_share(&report.share)?;
    writer.write_new_entries(&report.new_entries)?;
    let path = writer.write_correlations(&report.correlations)?;

    println!(
        "Analyzed {} entries across {} periods ({} categories correlated)",
        report.classified.len(),
        report.share.len(),
        report.correlations.len()
    );
    println!("Reports written to {}", path.display());
    println!();
    for insight in &report.insights {
        println!("[{}] {}", insight.slot, insight.text);
    }

    Ok(())
}
