// src/pipeline.rs

use arrow::record_batch::RecordBatch;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    config::Config,
    error::EtlError,
    fetch::{retrieve, Locations, Source, Workbook},
    merge::{ColumnContract, Conform, LabelTable, Normalizer},
    observe::{RunObserver, TracingObserver},
    period::{resolve_periods, Period},
    process::{extract_page, RawTable},
    schema::{PageLayout, Registry, VariantTag},
};

/// The layout chosen for one page of one period.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub page: String,
    pub tag: VariantTag,
    pub layout: PageLayout,
}

/// Fetches every requested snapshot and merges them into one table.
///
/// Retrieval runs with at most `max_concurrent_downloads` requests in flight;
/// raw tables are collected in request order and only merged once every
/// period is accounted for.
pub struct Pipeline<S> {
    source: S,
    registry: Registry,
    config: Config,
    observer: Arc<dyn RunObserver>,
    conformer: Box<dyn Conform + Send + Sync>,
    labels: LabelTable,
}

impl<S: Source> Pipeline<S> {
    pub fn new(source: S, registry: Registry, config: Config) -> Self {
        let labels = LabelTable::operational_status();
        let conformer = Box::new(ColumnContract::generators(labels.codes()));
        Self {
            source,
            registry,
            config,
            observer: Arc::new(TracingObserver),
            conformer,
            labels,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Retrieve, extract and merge. Unavailable periods are skipped; registry
    /// defects abort the run.
    #[instrument(level = "info", skip_all, fields(requested = periods.len()))]
    pub async fn run(&self, periods: &[Period]) -> Result<RecordBatch, EtlError> {
        let tables = self.collect(periods).await?;
        let normalizer = Normalizer {
            conformer: self.conformer.as_ref(),
            labels: &self.labels,
        };
        let merged = normalizer.normalize(&tables)?;
        info!(rows = merged.num_rows(), columns = merged.num_columns(), "merged");
        Ok(merged)
    }

    /// Raw tables for every retrievable period, in request order.
    pub async fn collect(&self, periods: &[Period]) -> Result<Vec<RawTable>, EtlError> {
        let periods = resolve_periods(periods, self.config.earliest_period);
        info!(periods = periods.len(), "resolved periods");

        let limit = self.config.max_concurrent_downloads.max(1);
        let per_period: Vec<Vec<RawTable>> = stream::iter(periods)
            .map(|period| self.snapshot(period))
            .buffered(limit)
            .try_collect()
            .await?;

        let tables: Vec<RawTable> = per_period.into_iter().flatten().collect();
        info!(tables = tables.len(), "collected raw tables");
        Ok(tables)
    }

    /// Resolve the layout of every registered page for `period`.
    pub fn plan(&self, period: Period) -> Result<Vec<PagePlan>, EtlError> {
        let mut plan = Vec::new();
        for page in self.registry.pages() {
            let m = self
                .registry
                .resolve(page, period, self.config.strict_variants)?;
            if !m.exact {
                self.observer.variant_fallback(period, page, &m.tag);
            }
            let layout = self.registry.layout(page, &m.tag)?.clone();
            plan.push(PagePlan {
                page: page.to_string(),
                tag: m.tag,
                layout,
            });
        }
        Ok(plan)
    }

    async fn snapshot(&self, period: Period) -> Result<Vec<RawTable>, EtlError> {
        self.observer.period_started(period);
        let plan = self.plan(period)?;
        let sheets: Vec<String> = plan
            .iter()
            .filter_map(|p| p.layout.sheet.clone())
            .collect();
        let locations = Locations::for_period(
            &self.config.current_url_template,
            &self.config.archive_url_template,
            period,
        );
        let Some(workbook) =
            retrieve(&self.source, period, &locations, &sheets, self.observer.as_ref()).await
        else {
            return Ok(Vec::new());
        };

        let observer = Arc::clone(&self.observer);
        tokio::task::spawn_blocking(move || {
            extract_planned(&workbook, &plan, period, observer.as_ref())
        })
        .await?
    }
}

/// Extract every planned page of one workbook, in plan order.
pub fn extract_planned(
    workbook: &Workbook,
    plan: &[PagePlan],
    period: Period,
    observer: &dyn RunObserver,
) -> Result<Vec<RawTable>, EtlError> {
    let mut tables = Vec::new();
    for p in plan {
        if let Some(table) = extract_page(workbook, &p.page, &p.layout, &p.tag, period)? {
            observer.page_extracted(period, &p.page, table.num_rows());
            tables.push(table);
        }
    }
    Ok(tables)
}
