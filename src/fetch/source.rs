// src/fetch/source.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{urls::Locations, workbook::Workbook};
use crate::{observe::RunObserver, period::Period};

/// Anything that can turn a location into a decoded workbook.
///
/// Only the sheets named in `sheets` need to be decoded.
#[allow(async_fn_in_trait)]
pub trait Source {
    async fn fetch(&self, url: &str, sheets: &[String]) -> Result<Workbook>;
}

/// Downloads workbooks over HTTP.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl Source for HttpSource {
    async fn fetch(&self, url: &str, sheets: &[String]) -> Result<Workbook> {
        debug!(%url, "GET");
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("non-success status {}", url))?
            .bytes()
            .await
            .with_context(|| format!("reading body from {}", url))?;

        // decoding a multi-megabyte workbook is CPU-bound; keep it off the runtime
        let sheets = sheets.to_vec();
        tokio::task::spawn_blocking(move || Workbook::from_bytes(bytes.to_vec(), &sheets))
            .await
            .context("workbook decode task")?
            .with_context(|| format!("decoding workbook from {}", url))
    }
}

/// Try the current location, then the archive. `None` when both fail.
///
/// Failure here never aborts the run: the observer hears about it and the
/// period simply contributes no rows.
pub async fn retrieve<S: Source>(
    source: &S,
    period: Period,
    locations: &Locations,
    sheets: &[String],
    observer: &dyn RunObserver,
) -> Option<Workbook> {
    let primary_err = match source.fetch(&locations.current, sheets).await {
        Ok(wb) => return Some(wb),
        Err(e) => e,
    };

    match source.fetch(&locations.archive, sheets).await {
        Ok(wb) => {
            observer.archive_used(period, &format!("{:#}", primary_err));
            Some(wb)
        }
        Err(archive_err) => {
            observer.period_skipped(
                period,
                &format!("current: {:#}; archive: {:#}", primary_err, archive_err),
            );
            None
        }
    }
}
