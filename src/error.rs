// src/error.rs

use arrow::error::ArrowError;
use thiserror::Error;

use crate::period::Period;
use crate::schema::VariantTag;

/// Structural failures that abort a run.
///
/// Anything that only degrades data (an unreachable period, a malformed
/// identifier, half a date) is handled in place and never becomes one of these.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("invalid period `{0}` (expected YYYY-MM)")]
    InvalidPeriod(String),

    #[error("no layouts registered for page `{page}`")]
    UnknownPage { page: String },

    #[error("page `{page}` has no layout for variant {tag}")]
    RegistryGap { page: String, tag: VariantTag },

    #[error("no exact layout for {period} on page `{page}` and strict variant matching is on")]
    NoExactVariant { page: String, period: Period },

    #[error("sheet `{sheet}` (page `{page}`) not found in workbook for {period}")]
    SheetMissing {
        page: String,
        sheet: String,
        period: Period,
    },

    #[error("sheet `{sheet}` for {period} has no header row after skipping {skip_header} rows")]
    HeaderMissing {
        sheet: String,
        period: Period,
        skip_header: usize,
    },

    #[error("invalid layout registry: {0}")]
    Registry(String),

    #[error("table operation failed: {0}")]
    Arrow(#[from] ArrowError),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
