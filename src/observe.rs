// src/observe.rs

use tracing::{debug, info, warn};

use crate::{period::Period, schema::VariantTag};

/// Progress hooks for a pipeline run.
///
/// The pipeline reports through this instead of logging directly, so callers
/// can collect skipped periods or low-confidence matches themselves.
pub trait RunObserver: Send + Sync {
    fn period_started(&self, _period: Period) {}

    /// The primary location failed and the archive copy was used.
    fn archive_used(&self, _period: Period, _primary_error: &str) {}

    /// Neither location produced a workbook; the period contributes no rows.
    fn period_skipped(&self, _period: Period, _reason: &str) {}

    /// The period had no layout of its own for `page`; `tag` was used instead.
    fn variant_fallback(&self, _period: Period, _page: &str, _tag: &VariantTag) {}

    fn page_extracted(&self, _period: Period, _page: &str, _rows: usize) {}
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn period_started(&self, period: Period) {
        info!(%period, "fetching snapshot");
    }

    fn archive_used(&self, period: Period, primary_error: &str) {
        info!(%period, error = %primary_error, "current location failed, using archive");
    }

    fn period_skipped(&self, period: Period, reason: &str) {
        warn!(%period, reason = %reason, "snapshot unavailable, skipping period");
    }

    fn variant_fallback(&self, period: Period, page: &str, tag: &VariantTag) {
        warn!(%period, page, variant = %tag, "no layout for period, using latest variant");
    }

    fn page_extracted(&self, period: Period, page: &str, rows: usize) {
        debug!(%period, page, rows, "extracted page");
    }
}
