// Entry point: collect salaries for the given companies and write the report

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gemini_client::GeminiClient;
use leetcode_client::LeetCodeClient;
use salary_scraper::{output, Config, Extractor, GeminiModel, LeetCodeSource, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_COMPANIES: &[&str] = &["Google"];

#[derive(Debug, Parser)]
#[command(name = "salary-scraper", about = "Collect compensation posts and extract salary records")]
struct Args {
    /// Company to collect (repeatable)
    #[arg(long = "company", value_name = "NAME")]
    companies: Vec<String>,

    /// Where to write the JSON report
    #[arg(short, long, default_value = "salaries.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,salary_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let companies: Vec<String> = if args.companies.is_empty() {
        DEFAULT_COMPANIES.iter().map(|c| c.to_string()).collect()
    } else {
        args.companies
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(model = %config.gemini_model, "Configuration loaded");

    let leetcode = LeetCodeClient::new()
        .context("Failed to create LeetCode client")?
        .with_base_url(&config.leetcode_base_url);
    let gemini = GeminiClient::new(&config.gemini_api_key);

    let pipeline = Pipeline::new(Extractor::new(GeminiModel::new(gemini, &config.gemini_model)))
        .with_source(LeetCodeSource::new(leetcode, config.leetcode_config()))
        .with_config(config.pipeline_config());

    let result = pipeline.run(&companies).await;

    for (company, source, failure) in result.failures() {
        tracing::warn!(
            company,
            source,
            stage = %failure.failure.stage,
            "No records: {}",
            failure.failure.message
        );
    }

    output::write_run_result(&args.output, &result)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
