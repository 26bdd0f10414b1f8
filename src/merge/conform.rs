// src/merge/conform.rs

use arrow::{
    array::{new_null_array, AsArray, StringArray},
    datatypes::DataType,
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::batch::{safe_cast, set_column};

/// Enforces the published output schema on a batch.
///
/// Implementations must be pure and idempotent.
pub trait Conform {
    fn conform(&self, batch: RecordBatch) -> Result<RecordBatch, ArrowError>;
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: DataType,
    /// Allowed values for categorical text columns.
    pub domain: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            domain: None,
        }
    }

    pub fn categorical<'a>(name: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            name: name.to_string(),
            data_type: DataType::Utf8,
            domain: Some(values.into_iter().map(str::to_string).collect()),
        }
    }
}

/// Declared columns with types and optional domains.
///
/// Missing declared columns are added as nulls, present ones are cast
/// (failed conversions become null), out-of-domain values are nulled, and
/// undeclared columns are left alone.
#[derive(Debug, Clone, Default)]
pub struct ColumnContract {
    fields: Vec<FieldSpec>,
}

impl ColumnContract {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The monthly generator table.
    pub fn generators<'a>(status_codes: impl IntoIterator<Item = &'a str>) -> Self {
        use DataType::*;
        let typed = [
            ("report_date", Date32),
            ("report_year", Int64),
            ("report_month", Int64),
            ("plant_id_eia", Int64),
            ("plant_name_eia", Utf8),
            ("utility_id_eia", Int64),
            ("utility_name_eia", Utf8),
            ("generator_id", Utf8),
            ("unit_id_eia", Utf8),
            ("state", Utf8),
            ("county", Utf8),
            ("sector_name_eia", Utf8),
            ("balancing_authority_code_eia", Utf8),
            ("technology_description", Utf8),
            ("energy_source_code_1", Utf8),
            ("prime_mover_code", Utf8),
            ("capacity_mw", Float64),
            ("summer_capacity_mw", Float64),
            ("winter_capacity_mw", Float64),
            ("energy_storage_capacity_mwh", Float64),
            ("net_capacity_mwdc", Float64),
            ("operating_year", Int64),
            ("operating_month", Int64),
            ("retirement_year", Int64),
            ("retirement_month", Int64),
            ("planned_retirement_year", Int64),
            ("planned_retirement_month", Int64),
            ("current_planned_operating_year", Int64),
            ("current_planned_operating_month", Int64),
            ("planned_derate_year", Int64),
            ("planned_derate_month", Int64),
            ("planned_net_summer_capacity_derate_mw", Float64),
            ("planned_uprate_year", Int64),
            ("planned_uprate_month", Int64),
            ("planned_net_summer_capacity_uprate_mw", Float64),
            ("latitude", Float64),
            ("longitude", Float64),
        ];
        let mut fields: Vec<FieldSpec> = typed
            .iter()
            .map(|(name, dtype)| FieldSpec::new(name, dtype.clone()))
            .collect();
        fields.push(FieldSpec::categorical(
            crate::policy::STATUS_CODE_COLUMN,
            status_codes,
        ));
        Self { fields }
    }
}

impl Conform for ColumnContract {
    fn conform(&self, batch: RecordBatch) -> Result<RecordBatch, ArrowError> {
        let rows = batch.num_rows();
        let mut out = batch;
        for field in &self.fields {
            let mut col = match out.column_by_name(&field.name) {
                Some(c) => safe_cast(c, &field.data_type)?,
                None => new_null_array(&field.data_type, rows),
            };
            if let Some(domain) = &field.domain {
                if let Some(text) = col.as_string_opt::<i32>() {
                    let restricted: StringArray = text
                        .iter()
                        .map(|v| v.filter(|s| domain.iter().any(|d| d == s)))
                        .collect();
                    col = Arc::new(restricted);
                }
            }
            out = set_column(&out, &field.name, col)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, Int64Array};
    use arrow::datatypes::{Float64Type, Int64Type};

    fn utf8(vals: &[Option<&str>]) -> ArrayRef {
        Arc::new(StringArray::from(vals.to_vec()))
    }

    fn contract() -> ColumnContract {
        ColumnContract::new(vec![
            FieldSpec::new("plant_id_eia", DataType::Int64),
            FieldSpec::new("capacity_mw", DataType::Float64),
            FieldSpec::new("report_date", DataType::Date32),
            FieldSpec::categorical("operational_status_code", ["OP", "RE"]),
        ])
    }

    fn sample() -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            ("plant_id_eia", utf8(&[Some("3"), Some("x")])),
            ("extra", utf8(&[Some("a"), None])),
            ("capacity_mw", utf8(&[Some("1.5"), None])),
            ("operational_status_code", utf8(&[Some("OP"), Some("??")])),
        ])
        .unwrap()
    }

    #[test]
    fn casts_adds_and_restricts() {
        let out = contract().conform(sample()).unwrap();
        assert_eq!(
            crate::batch::column_names(&out),
            vec!["plant_id_eia", "extra", "capacity_mw", "operational_status_code", "report_date"]
        );
        let col = |name: &str| out.column_by_name(name).unwrap().clone();
        assert_eq!(
            col("plant_id_eia").as_primitive::<Int64Type>(),
            &Int64Array::from(vec![Some(3), None])
        );
        assert_eq!(
            col("capacity_mw").as_primitive::<Float64Type>(),
            &Float64Array::from(vec![Some(1.5), None])
        );
        assert_eq!(col("report_date").data_type(), &DataType::Date32);
        assert_eq!(col("report_date").null_count(), 2);
        assert_eq!(
            col("operational_status_code").as_string::<i32>(),
            &StringArray::from(vec![Some("OP"), None])
        );
        assert_eq!(
            col("extra").as_string::<i32>(),
            &StringArray::from(vec![Some("a"), None])
        );
    }

    #[test]
    fn conform_is_idempotent() {
        let c = ColumnContract::generators(["OP", "RE"]);
        let once = c.conform(sample()).unwrap();
        let twice = c.conform(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
