//! The batch-fetch orchestrator.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use dealscan_catalog::{
    normalize_item, partition, Batch, CatalogProvider, IdentifierRegistry, LinkSettings,
    RateLimiter, RawItem,
};
use dealscan_core::{sort_by_discount, AppConfig, DealRecord};

use crate::error::PipelineError;
use crate::input::{discover_sources, read_source, InputSource};
use crate::output::{batch_file_path, reset_output_root, write_records, FINAL_ARTIFACT};

/// Directory and batching settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Requested batch size; clamped to the provider maximum.
    pub batch_size: NonZeroUsize,
    pub links: LinkSettings,
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input_dir: config.input_dir.clone(),
            output_dir: config.output_dir.clone(),
            batch_size: NonZeroUsize::new(config.effective_batch_size())
                .unwrap_or(NonZeroUsize::MIN),
            links: LinkSettings {
                storefront_domain: config.affiliate_domain.clone(),
                affiliate_tag: config.affiliate_tag.clone(),
            },
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub sources: usize,
    /// Unique identifiers across all sources.
    pub identifiers: usize,
    pub duplicates: usize,
    pub unresolved: usize,
    pub batches: usize,
    pub records: usize,
    /// Records with `HasDiscount == true`.
    pub discounted: usize,
}

/// What a run would do for one source, without any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlan {
    pub stem: String,
    pub identifiers: usize,
    pub duplicates: usize,
    pub unresolved: usize,
    /// 1-based `(first, last)` positions of each batch.
    pub batches: Vec<(usize, usize)>,
}

/// Drives a run against one provider.
///
/// Batches are processed strictly one after another. The pipeline owns the
/// only [`RateLimiter`], so the spacing between provider calls holds across
/// sources as well as within one.
pub struct Pipeline<P> {
    provider: P,
    limiter: RateLimiter,
    options: PipelineOptions,
}

impl<P: CatalogProvider> Pipeline<P> {
    #[must_use]
    pub fn new(provider: P, limiter: RateLimiter, options: PipelineOptions) -> Self {
        Self {
            provider,
            limiter,
            options,
        }
    }

    /// Batch size actually used: the requested size, at most the provider
    /// maximum.
    #[must_use]
    pub fn batch_size(&self) -> NonZeroUsize {
        let max = NonZeroUsize::new(self.provider.max_batch_size()).unwrap_or(NonZeroUsize::MIN);
        self.options.batch_size.min(max)
    }

    /// Deduplicates and partitions every source without fetching anything or
    /// touching the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InputDirMissing`] or [`PipelineError::Input`]
    /// if the sources cannot be read.
    pub async fn plan(&self) -> Result<Vec<SourcePlan>, PipelineError> {
        let batch_size = self.batch_size();
        let mut plans = Vec::new();

        for source in discover_sources(&self.options.input_dir).await? {
            let registry = load_registry(&source).await?;
            let batches = partition(registry.identifiers(), batch_size)
                .iter()
                .map(|b| (b.first, b.last()))
                .collect();
            plans.push(SourcePlan {
                stem: source.stem,
                identifiers: registry.len(),
                duplicates: registry.duplicates().len(),
                unresolved: registry.unresolved().len(),
                batches,
            });
        }

        Ok(plans)
    }

    /// Runs every source, then writes the aggregated artifact.
    ///
    /// The output root is cleared first. Any fetch or persist failure aborts
    /// the run; batches already persisted stay on disk.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] encountered.
    pub async fn run(&mut self) -> Result<RunStats, PipelineError> {
        let sources = discover_sources(&self.options.input_dir).await?;
        reset_output_root(&self.options.output_dir).await?;

        tracing::info!(
            provider = self.provider.name(),
            sources = sources.len(),
            batch_size = self.batch_size().get(),
            interval_ms = u64::try_from(self.limiter.interval().as_millis()).unwrap_or(u64::MAX),
            "starting run"
        );

        let mut stats = RunStats {
            sources: sources.len(),
            ..RunStats::default()
        };
        let mut all_records = Vec::new();

        for source in &sources {
            let records = self.process_source(source, &mut stats).await?;
            all_records.extend(records);
        }

        sort_by_discount(&mut all_records);
        stats.records = all_records.len();
        stats.discounted = all_records
            .iter()
            .filter(|r| r.discount.has_discount)
            .count();

        let final_path = self.options.output_dir.join(FINAL_ARTIFACT);
        write_records(&final_path, &all_records).await?;
        tracing::info!(
            path = %final_path.display(),
            records = stats.records,
            discounted = stats.discounted,
            "wrote aggregated deals"
        );

        Ok(stats)
    }

    async fn process_source(
        &mut self,
        source: &InputSource,
        stats: &mut RunStats,
    ) -> Result<Vec<DealRecord>, PipelineError> {
        let registry = load_registry(source).await?;

        for dup in registry.duplicates() {
            tracing::warn!(
                source = %source.stem,
                identifier = %dup.identifier,
                first_line = dup.first_line,
                duplicate_line = dup.duplicate_line,
                "duplicate identifier"
            );
        }
        for unresolved in registry.unresolved() {
            tracing::warn!(
                source = %source.stem,
                line = unresolved.line,
                reference = %unresolved.reference,
                "no identifier in reference"
            );
        }

        let batches = partition(registry.identifiers(), self.batch_size());
        tracing::info!(
            source = %source.stem,
            identifiers = registry.len(),
            duplicates = registry.duplicates().len(),
            unresolved = registry.unresolved().len(),
            batches = batches.len(),
            "source deduplicated"
        );

        stats.identifiers += registry.len();
        stats.duplicates += registry.duplicates().len();
        stats.unresolved += registry.unresolved().len();

        let mut records = Vec::with_capacity(registry.len());
        for batch in &batches {
            let batch_records = self.process_batch(source, &registry, batch).await?;
            stats.batches += 1;
            records.extend(batch_records);
        }

        Ok(records)
    }

    async fn process_batch(
        &mut self,
        source: &InputSource,
        registry: &IdentifierRegistry,
        batch: &Batch<'_, String>,
    ) -> Result<Vec<DealRecord>, PipelineError> {
        if self.provider.makes_requests() {
            self.limiter.acquire().await;
        }

        tracing::debug!(
            source = %source.stem,
            batch = batch.number,
            first = batch.first,
            last = batch.last(),
            "fetching batch"
        );
        let items = self
            .provider
            .fetch_batch(batch.items)
            .await
            .map_err(|e| PipelineError::Fetch {
                source_name: source.stem.clone(),
                first: batch.first,
                last: batch.last(),
                source: e,
            })?;

        let records = self.records_in_batch_order(source, registry, batch, items);

        let path = batch_file_path(
            &self.options.output_dir,
            &source.stem,
            batch.first,
            batch.last(),
        );
        write_records(&path, &records).await?;
        tracing::info!(
            source = %source.stem,
            batch = batch.number,
            requested = batch.len(),
            records = records.len(),
            path = %path.display(),
            "persisted batch"
        );

        Ok(records)
    }

    /// Matches returned items to the batch's identifiers: one record per
    /// identifier the provider answered for, in batch order. Items for
    /// identifiers outside the batch and repeated items are dropped.
    fn records_in_batch_order(
        &self,
        source: &InputSource,
        registry: &IdentifierRegistry,
        batch: &Batch<'_, String>,
        items: Vec<RawItem>,
    ) -> Vec<DealRecord> {
        let mut by_identifier: HashMap<String, RawItem> = HashMap::with_capacity(items.len());
        for item in items {
            let key = item.identifier().trim().to_ascii_uppercase();
            by_identifier.entry(key).or_insert(item);
        }

        let mut records = Vec::with_capacity(batch.len());
        let mut missing = Vec::new();
        for identifier in batch.items {
            match by_identifier.remove(identifier) {
                Some(item) => records.push(normalize_item(
                    item,
                    registry.reference_for(identifier),
                    &self.options.links,
                )),
                None => missing.push(identifier.as_str()),
            }
        }

        if !missing.is_empty() {
            tracing::warn!(
                source = %source.stem,
                batch = batch.number,
                requested = batch.len(),
                returned = records.len(),
                missing = %missing.join(","),
                "provider returned fewer items than requested"
            );
        }
        if !by_identifier.is_empty() {
            tracing::debug!(
                source = %source.stem,
                batch = batch.number,
                unexpected = by_identifier.len(),
                "ignoring items outside the batch"
            );
        }

        records
    }
}

async fn load_registry(source: &InputSource) -> Result<IdentifierRegistry, PipelineError> {
    let text = read_source(source).await?;
    Ok(IdentifierRegistry::from_text(&text))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
