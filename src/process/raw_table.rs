use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

use crate::period::Period;

/// One page of one snapshot, straight off the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Canonical column names in sheet order, then the report stamp columns.
    /// Every column is text; typing happens in the merge stage.
    pub batch: RecordBatch,
    pub period: Period,
    pub page: String,
}

impl RawTable {
    /// Build from row-major cells. Short rows are padded with nulls.
    pub fn from_rows(
        headers: &[String],
        rows: &[Vec<Option<String>>],
        period: Period,
        page: &str,
    ) -> Result<Self, ArrowError> {
        let columns: Vec<ArrayRef> = (0..headers.len())
            .map(|i| {
                let col: StringArray = rows
                    .iter()
                    .map(|row| row.get(i).and_then(|c| c.as_deref()))
                    .collect();
                Arc::new(col) as ArrayRef
            })
            .collect();
        let fields: Vec<Field> = headers
            .iter()
            .map(|h| Field::new(h, DataType::Utf8, true))
            .collect();
        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &RecordBatchOptions::new().with_row_count(Some(rows.len())),
        )?;
        Ok(Self {
            batch,
            period,
            page: page.to_string(),
        })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}
