use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use dealscan_catalog::{CatalogClient, RateLimiter};
use dealscan_core::ProviderKind;
use dealscan_pipeline::{Pipeline, PipelineOptions};
use tracing_subscriber::EnvFilter;

/// Flags override the matching `DEALSCAN_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "dealscan")]
#[command(about = "Find discounted listings from lists of product links")]
struct Cli {
    /// Directory of `*.txt` files, one product link per line.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Output root; cleared at the start of every run.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Catalog provider: `paapi` or `keepa`.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Identifiers per provider request, capped at the provider maximum.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: Option<u64>,

    /// Deduplicate and plan batches without calling the provider or writing
    /// output.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Flag values keyed by the environment variable each one overrides.
    fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(dir) = &self.input_dir {
            overrides.insert("DEALSCAN_INPUT_DIR".to_owned(), dir.display().to_string());
        }
        if let Some(dir) = &self.output_dir {
            overrides.insert("DEALSCAN_OUTPUT_DIR".to_owned(), dir.display().to_string());
        }
        if let Some(provider) = self.provider {
            overrides.insert("DEALSCAN_PROVIDER".to_owned(), provider.to_string());
        }
        if let Some(size) = self.batch_size {
            overrides.insert("DEALSCAN_BATCH_SIZE".to_owned(), size.to_string());
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dealscan_core::load_app_config_with_overrides(&cli.config_overrides())?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        provider = %config.provider,
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        affiliate_tag = config.affiliate_tag.is_some(),
        proxy = config.proxy_url.is_some(),
        "configuration loaded"
    );

    let client = CatalogClient::from_config(&config)?;
    let mut pipeline = Pipeline::new(
        client,
        RateLimiter::new(config.min_interval()),
        PipelineOptions::from_config(&config),
    );

    if cli.dry_run {
        for plan in pipeline.plan().await? {
            tracing::info!(
                source = %plan.stem,
                identifiers = plan.identifiers,
                duplicates = plan.duplicates,
                unresolved = plan.unresolved,
                batches = plan.batches.len(),
                "dry run: planned source"
            );
            for (first, last) in &plan.batches {
                tracing::info!(source = %plan.stem, first, last, "dry run: planned batch");
            }
        }
        return Ok(());
    }

    let stats = pipeline.run().await?;
    tracing::info!(
        sources = stats.sources,
        identifiers = stats.identifiers,
        duplicates = stats.duplicates,
        unresolved = stats.unresolved,
        batches = stats.batches,
        records = stats.records,
        discounted = stats.discounted,
        "run complete"
    );

    Ok(())
}
