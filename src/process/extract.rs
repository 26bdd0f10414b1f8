// src/process/extract.rs

use tracing::{debug, instrument, trace};

use super::{raw_table::RawTable, utils};
use crate::{
    error::EtlError,
    fetch::{Cell, Workbook},
    period::Period,
    policy,
    schema::{PageLayout, VariantTag},
};

/// Read one page out of a workbook using the layout of its resolved variant.
///
/// Returns `Ok(None)` when the layout says the page was not published for
/// this variant. A layout without a column map, a declared sheet that is not
/// in the workbook, or a header row past the end of the sheet are errors.
#[instrument(level = "debug", skip_all, fields(page = %page, period = %period, tag = %tag))]
pub fn extract_page(
    workbook: &Workbook,
    page: &str,
    layout: &PageLayout,
    tag: &VariantTag,
    period: Period,
) -> Result<Option<RawTable>, EtlError> {
    let Some(sheet_name) = layout.sheet.as_deref() else {
        debug!(page, "page not published for this variant");
        return Ok(None);
    };
    if layout.columns.is_empty() {
        return Err(EtlError::RegistryGap {
            page: page.to_string(),
            tag: tag.clone(),
        });
    }

    let rows = workbook
        .sheet(sheet_name)
        .ok_or_else(|| EtlError::SheetMissing {
            page: page.to_string(),
            sheet: sheet_name.to_string(),
            period,
        })?;

    // 1) header row sits right after the skipped preamble
    let header = rows
        .get(layout.skip_header)
        .ok_or_else(|| EtlError::HeaderMissing {
            sheet: sheet_name.to_string(),
            period,
            skip_header: layout.skip_header,
        })?;

    // 2) map sheet columns to canonical names; unmapped ones are dropped
    let mut keep: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let Some(label) = cell.to_text() else { continue };
        let simple = utils::simplify_column_name(&label);
        match layout.columns.get(&simple) {
            Some(canonical) if keep.iter().any(|(_, c)| c == canonical) => {
                debug!(page, column = %canonical, "duplicate column, keeping first");
            }
            Some(canonical) => keep.push((idx, canonical.clone())),
            None => trace!(page, column = %simple, "unmapped column dropped"),
        }
    }

    // 3) data rows: everything after the header, minus the trailer notes
    let body = &rows[layout.skip_header + 1..];
    let body = &body[..body.len().saturating_sub(layout.skip_footer)];

    let mut out_rows: Vec<Vec<Option<String>>> = body
        .iter()
        .filter(|row| !row.iter().all(Cell::is_empty))
        .map(|row| {
            keep.iter()
                .map(|(idx, _)| utils::fix_na(row.get(*idx).and_then(Cell::to_text)))
                .collect()
        })
        .collect();

    let mut headers: Vec<String> = keep.into_iter().map(|(_, name)| name).collect();

    // 4) identifier clean-up
    for (col, name) in headers.iter().enumerate() {
        let name = name.as_str();
        if policy::INTEGER_ID_COLUMNS.contains(&name) {
            for row in out_rows.iter_mut() {
                row[col] = utils::normalize_integer_id(row[col].take());
            }
        } else if policy::ZERO_PADDED_ID_COLUMNS.contains(&name) {
            for row in out_rows.iter_mut() {
                row[col] = row[col].take().map(|id| utils::strip_leading_zeros(&id));
            }
        } else if name == policy::STATUS_CODE_COLUMN {
            for row in out_rows.iter_mut() {
                row[col] = utils::status_code(row[col].take());
            }
        }
    }

    // 5) stamp the snapshot the rows came from
    let report_date = period.first_day().map(|d| d.format("%Y-%m-%d").to_string());
    headers.push(policy::REPORT_YEAR_COLUMN.to_string());
    headers.push(policy::REPORT_MONTH_COLUMN.to_string());
    headers.push(policy::REPORT_DATE_COLUMN.to_string());
    for row in out_rows.iter_mut() {
        row.push(Some(period.year.to_string()));
        row.push(Some(period.month.to_string()));
        row.push(report_date.clone());
    }

    debug!(page, sheet = sheet_name, rows = out_rows.len(), "extracted");
    Ok(Some(RawTable::from_rows(&headers, &out_rows, period, page)?))
}
