//! Turn the per-period, per-page raw tables into one typed table.
//!
//! Every step is a plain function over a `RecordBatch` and the fixed policy
//! lists, so each can be exercised on its own. `normalize` runs them in
//! order.

pub mod conform;
pub mod labels;

use arrow::{
    array::{new_null_array, Array, ArrayRef, AsArray, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray},
    compute::{and, filter_record_batch, is_not_null},
    datatypes::{DataType, Date32Type, Float64Type, Int64Type},
    error::ArrowError,
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use crate::{
    batch::{self, safe_cast, set_column, to_int64},
    policy,
    process::RawTable,
};

pub use conform::{ColumnContract, Conform, FieldSpec};
pub use labels::LabelTable;

static YEAR_MONTH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(year|month)$").expect("valid regex"));

/// 1) Stack raw tables in the order given (period, then page). No dedup.
pub fn concat(tables: &[RawTable]) -> Result<RecordBatch, ArrowError> {
    let batches: Vec<RecordBatch> = tables.iter().map(|t| t.batch.clone()).collect();
    batch::vstack(&batches)
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>, ArrowError> {
    batch
        .column_by_name(name)
        .map(|col| safe_cast(col, &DataType::Utf8).map(|c| c.as_string::<i32>().clone()))
        .transpose()
}

/// 2) Fill nulls in `column` with `value`; adds the column if it is absent.
pub fn fill_nulls(batch: &RecordBatch, column: &str, value: &str) -> Result<RecordBatch, ArrowError> {
    let filled: StringArray = match text_column(batch, column)? {
        Some(text) => text.iter().map(|v| Some(v.unwrap_or(value))).collect(),
        None => std::iter::repeat(Some(value)).take(batch.num_rows()).collect(),
    };
    set_column(batch, column, Arc::new(filled))
}

/// 3) Drop rows where any of `required` is null (or the column is missing).
pub fn drop_rows_missing(batch: &RecordBatch, required: &[&str]) -> Result<RecordBatch, ArrowError> {
    let rows = batch.num_rows();
    let mut mask = BooleanArray::from(vec![true; rows]);
    for name in required {
        let present = match batch.column_by_name(name) {
            Some(col) => is_not_null(col.as_ref())?,
            None => BooleanArray::from(vec![false; rows]),
        };
        mask = and(&mask, &present)?;
    }
    let kept = filter_record_batch(batch, &mask)?;
    let dropped = rows - kept.num_rows();
    if dropped > 0 {
        debug!(dropped, "rows without required identifiers dropped");
    }
    Ok(kept)
}

fn is_placeholder(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.parse::<f64>().is_ok_and(|x| x == 0.0)
}

/// 4) Null out blank strings and zeros in placeholder-prone columns.
pub fn null_zero_sentinels(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch, ArrowError> {
    let mut out = batch.clone();
    for name in columns {
        let Some(col) = out.column_by_name(name).cloned() else { continue };
        let cleaned: ArrayRef = match col.data_type() {
            DataType::Utf8 => Arc::new(
                col.as_string::<i32>()
                    .iter()
                    .map(|v| v.filter(|s| !is_placeholder(s)))
                    .collect::<StringArray>(),
            ),
            DataType::Int64 => Arc::new(
                col.as_primitive::<Int64Type>()
                    .iter()
                    .map(|v| v.filter(|x| *x != 0))
                    .collect::<Int64Array>(),
            ),
            DataType::Float64 => Arc::new(
                col.as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| v.filter(|x| *x != 0.0))
                    .collect::<Float64Array>(),
            ),
            _ => continue,
        };
        out = set_column(&out, name, cleaned)?;
    }
    Ok(out)
}

/// 6) Add `label_column` from `code_column` via `labels`. Unknown codes give null.
pub fn add_labels(
    batch: &RecordBatch,
    code_column: &str,
    label_column: &str,
    labels: &LabelTable,
) -> Result<RecordBatch, ArrowError> {
    let values: ArrayRef = match text_column(batch, code_column)? {
        Some(codes) => Arc::new(
            codes
                .iter()
                .map(|code| code.and_then(|c| labels.label(c)))
                .collect::<StringArray>(),
        ),
        None => new_null_array(&DataType::Utf8, batch.num_rows()),
    };
    set_column(batch, label_column, values)
}

/// First of the month, or `None` if either part is missing or out of range.
pub fn first_of_month(year: Option<i64>, month: Option<i64>) -> Option<NaiveDate> {
    let year = i32::try_from(year?).ok()?;
    let month = u32::try_from(month?).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn int_column(batch: &RecordBatch, name: &str) -> Result<Option<Int64Array>, ArrowError> {
    batch
        .column_by_name(name)
        .map(|col| to_int64(col).map(|c| c.as_primitive::<Int64Type>().clone()))
        .transpose()
}

fn int_at(col: &Option<Int64Array>, row: usize) -> Option<i64> {
    col.as_ref().filter(|c| c.is_valid(row)).map(|c| c.value(row))
}

/// 7) Build each `(date, year, month)` date column from its parts, day 1.
pub fn build_dates(batch: &RecordBatch, groups: &[(&str, &str, &str)]) -> Result<RecordBatch, ArrowError> {
    let mut out = batch.clone();
    for (date_col, year_col, month_col) in groups {
        let years = int_column(&out, year_col)?;
        let months = int_column(&out, month_col)?;
        let dates: Date32Array = (0..out.num_rows())
            .map(|row| {
                first_of_month(int_at(&years, row), int_at(&months, row))
                    .map(Date32Type::from_naive_date)
            })
            .collect();
        out = set_column(&out, date_col, Arc::new(dates))?;
    }
    Ok(out)
}

/// 8) Every `*_year` / `*_month` column becomes a nullable integer.
pub fn coerce_year_month(batch: &RecordBatch) -> Result<RecordBatch, ArrowError> {
    let mut out = batch.clone();
    for name in batch::column_names(batch) {
        if !YEAR_MONTH_SUFFIX.is_match(&name) {
            continue;
        }
        let Some(col) = out.column_by_name(&name).cloned() else { continue };
        out = set_column(&out, &name, to_int64(&col)?)?;
    }
    Ok(out)
}

/// 9) Remove columns that only exist as extraction leftovers.
pub fn drop_columns(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch, ArrowError> {
    batch::drop_columns(batch, columns)
}

/// Collaborators the normalizer delegates to.
pub struct Normalizer<'a> {
    pub conformer: &'a dyn Conform,
    pub labels: &'a LabelTable,
}

impl Normalizer<'_> {
    /// Run the full merge over every table that was retrieved.
    pub fn normalize(&self, tables: &[RawTable]) -> Result<RecordBatch, ArrowError> {
        let merged = concat(tables)?;
        let merged = fill_nulls(&merged, policy::STATUS_CODE_COLUMN, policy::RETIRED_STATUS_CODE)?;
        let merged = drop_rows_missing(&merged, policy::REQUIRED_ID_COLUMNS)?;
        let merged = null_zero_sentinels(&merged, policy::ZERO_SENTINEL_COLUMNS)?;
        let merged = self.conformer.conform(merged)?;
        let merged = add_labels(
            &merged,
            policy::STATUS_CODE_COLUMN,
            policy::STATUS_LABEL_COLUMN,
            self.labels,
        )?;
        let merged = build_dates(&merged, policy::DATE_GROUPS)?;
        let merged = coerce_year_month(&merged)?;
        let merged = drop_columns(&merged, policy::SCRATCH_COLUMNS)?;
        let merged = batch::reorder(&merged, policy::PRIORITY_COLUMNS)?;
        debug!(rows = merged.num_rows(), columns = merged.num_columns(), "normalized");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;

    fn utf8(vals: &[Option<&str>]) -> ArrayRef {
        Arc::new(StringArray::from(vals.to_vec()))
    }

    fn batch_of(cols: Vec<(&str, ArrayRef)>) -> RecordBatch {
        cols.into_iter()
            .fold(batch::empty(), |b, (name, col)| set_column(&b, name, col).unwrap())
    }

    fn text<'a>(b: &'a RecordBatch, name: &str) -> &'a StringArray {
        b.column_by_name(name).unwrap().as_string::<i32>()
    }

    fn ints<'a>(b: &'a RecordBatch, name: &str) -> &'a Int64Array {
        b.column_by_name(name).unwrap().as_primitive::<Int64Type>()
    }

    fn dates<'a>(b: &'a RecordBatch, name: &str) -> &'a Date32Array {
        b.column_by_name(name).unwrap().as_primitive::<Date32Type>()
    }

    fn day(y: i32, m: u32) -> Option<i32> {
        NaiveDate::from_ymd_opt(y, m, 1).map(Date32Type::from_naive_date)
    }

    fn raw(period: Period, page: &str, headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<Option<String>>> = rows
            .iter()
            .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
            .collect();
        RawTable::from_rows(&headers, &rows, period, page).unwrap()
    }

    #[test]
    fn concat_keeps_retrieval_order_and_unions_columns() {
        let p = Period::new(2022, 3).unwrap();
        let a = raw(p, "op", &["plant_id_eia", "generator_id"], &[&[Some("1"), Some("A")]]);
        let b = raw(p, "re", &["generator_id", "retirement_year"], &[&[Some("B"), Some("2020")]]);
        let f = concat(&[a, b]).unwrap();
        assert_eq!(
            batch::column_names(&f),
            vec!["plant_id_eia", "generator_id", "retirement_year"]
        );
        assert_eq!(text(&f, "generator_id"), &StringArray::from(vec!["A", "B"]));
        assert_eq!(text(&f, "plant_id_eia"), &StringArray::from(vec![Some("1"), None]));
    }

    #[test]
    fn status_fill_and_required_ids() {
        let f = batch_of(vec![
            ("plant_id_eia", utf8(&[Some("1"), None, Some("3")])),
            ("generator_id", utf8(&[Some("A"), Some("B"), None])),
            ("operational_status_code", utf8(&[None, Some("OP"), Some("SB")])),
        ]);

        let f = fill_nulls(&f, "operational_status_code", "RE").unwrap();
        let f = drop_rows_missing(&f, &["plant_id_eia", "generator_id"]).unwrap();

        assert_eq!(f.num_rows(), 1);
        assert_eq!(text(&f, "operational_status_code"), &StringArray::from(vec!["RE"]));
    }

    #[test]
    fn fill_adds_missing_status_column() {
        let f = batch_of(vec![("generator_id", utf8(&[Some("A"), Some("B")]))]);
        let f = fill_nulls(&f, "operational_status_code", "RE").unwrap();
        assert_eq!(text(&f, "operational_status_code"), &StringArray::from(vec!["RE", "RE"]));
    }

    #[test]
    fn rows_are_dropped_when_a_required_column_is_absent() {
        let f = batch_of(vec![("generator_id", utf8(&[Some("A"), Some("B")]))]);
        let f = drop_rows_missing(&f, &["plant_id_eia", "generator_id"]).unwrap();
        assert_eq!(f.num_rows(), 0);
        assert_eq!(f.num_columns(), 1);
    }

    #[test]
    fn zero_sentinels_become_null() {
        let f = batch_of(vec![
            ("latitude", utf8(&[Some("0"), Some("0.0"), Some("41.2"), Some(" ")])),
            ("capacity_mw", utf8(&[Some("0"), Some("0"), Some("1"), Some("2")])),
            ("planned_derate_year", Arc::new(Int64Array::from(vec![Some(0), Some(2024), None, Some(0)])) as ArrayRef),
        ]);
        let f = null_zero_sentinels(&f, &["latitude", "planned_derate_year", "not_there"]).unwrap();
        assert_eq!(
            text(&f, "latitude"),
            &StringArray::from(vec![None, None, Some("41.2"), None])
        );
        assert_eq!(
            ints(&f, "planned_derate_year"),
            &Int64Array::from(vec![None, Some(2024), None, None])
        );
        assert_eq!(text(&f, "capacity_mw").value(0), "0");
    }

    #[test]
    fn labels_are_null_safe() {
        let f = batch_of(vec![(
            "operational_status_code",
            utf8(&[Some("RE"), Some("ZZ"), None]),
        )]);
        let labels = LabelTable::operational_status();
        let f = add_labels(&f, "operational_status_code", "operational_status", &labels).unwrap();
        let col = text(&f, "operational_status");
        assert_eq!(Some(col.value(0)), labels.label("RE"));
        assert!(col.is_null(1));
        assert!(col.is_null(2));
    }

    #[test]
    fn dates_from_year_month_pairs() {
        let f = batch_of(vec![
            ("operating_year", utf8(&[Some("2021"), Some("2021"), Some("2021.0"), Some("2021")])),
            ("operating_month", utf8(&[Some("6"), None, Some("6.0"), Some("13")])),
        ]);
        let f = build_dates(&f, &[("generator_operating_date", "operating_year", "operating_month")]).unwrap();
        assert_eq!(
            dates(&f, "generator_operating_date"),
            &Date32Array::from(vec![day(2021, 6), None, day(2021, 6), None])
        );
    }

    #[test]
    fn dates_for_absent_parts_are_null() {
        let f = batch_of(vec![("generator_id", utf8(&[Some("A")]))]);
        let f = build_dates(&f, &[("generator_retirement_date", "retirement_year", "retirement_month")]).unwrap();
        assert_eq!(
            dates(&f, "generator_retirement_date"),
            &Date32Array::from(vec![None::<i32>])
        );
    }

    #[test]
    fn year_and_month_columns_become_integers() {
        let f = batch_of(vec![
            ("operating_year", utf8(&[Some("2022.0"), Some("bad")])),
            ("planned_derate_month", Arc::new(Float64Array::from(vec![Some(3.0), None])) as ArrayRef),
            ("yearly_total", utf8(&[Some("1.5"), None])),
        ]);
        let f = coerce_year_month(&f).unwrap();
        assert_eq!(ints(&f, "operating_year"), &Int64Array::from(vec![Some(2022), None]));
        assert_eq!(ints(&f, "planned_derate_month"), &Int64Array::from(vec![Some(3), None]));
        assert_eq!(f.column_by_name("yearly_total").unwrap().data_type(), &DataType::Utf8);
    }

    #[test]
    fn normalize_end_to_end() {
        let p = Period::new(2022, 3).unwrap();
        let operating = raw(
            p,
            "generators_operating",
            &[
                "utility_id_eia",
                "generator_id",
                "plant_id_eia",
                "operating_year",
                "operating_month",
                "operational_status_code",
                "latitude",
                "google_map",
                "plant_name_eia",
                "report_year",
                "report_month",
                "report_date",
            ],
            &[
                &[Some("10"), Some("1"), Some("3"), Some("2021"), Some("6"), Some("OP"), Some("0"), Some("x"), Some("Barry"), Some("2022"), Some("3"), Some("2022-03-01")],
                &[Some("10"), None, Some("3"), Some("2021"), Some("6"), Some("OP"), None, None, Some("Barry"), Some("2022"), Some("3"), Some("2022-03-01")],
            ],
        );
        let retired = raw(
            p,
            "generators_retired",
            &["plant_id_eia", "generator_id", "retirement_year", "retirement_month", "report_year", "report_month", "report_date"],
            &[&[Some("4"), Some("GT1"), Some("2019"), Some("12"), Some("2022"), Some("3"), Some("2022-03-01")]],
        );

        let labels = LabelTable::operational_status();
        let contract = ColumnContract::generators(labels.codes());
        let norm = Normalizer {
            conformer: &contract,
            labels: &labels,
        };
        let out = norm.normalize(&[operating, retired]).unwrap();

        assert_eq!(out.num_rows(), 2);
        assert_eq!(
            &batch::column_names(&out)[..7],
            &[
                "report_date",
                "plant_id_eia",
                "plant_name_eia",
                "utility_id_eia",
                "utility_name_eia",
                "generator_id",
                "technology_description"
            ]
        );
        assert!(out.column_by_name("google_map").is_none());
        assert_eq!(ints(&out, "plant_id_eia"), &Int64Array::from(vec![3, 4]));
        assert_eq!(out.column_by_name("latitude").unwrap().null_count(), 2);
        assert_eq!(text(&out, "operational_status_code"), &StringArray::from(vec!["OP", "RE"]));
        assert_eq!(
            dates(&out, "generator_operating_date"),
            &Date32Array::from(vec![day(2021, 6), None])
        );
        assert_eq!(
            dates(&out, "generator_retirement_date"),
            &Date32Array::from(vec![None, day(2019, 12)])
        );
        assert_eq!(ints(&out, "report_year"), &Int64Array::from(vec![2022, 2022]));
        assert_eq!(dates(&out, "report_date"), &Date32Array::from(vec![day(2022, 3); 2]));
        for field in out.schema().fields() {
            let name = field.name();
            if name.ends_with("_year") || name.ends_with("_month") {
                assert_eq!(field.data_type(), &DataType::Int64, "{name}");
            }
        }
    }
}
