// src/batch.rs

//! Column-level edits on arrow `RecordBatch`es.
//!
//! Batches are immutable, so every helper returns a new batch that shares
//! the untouched column buffers with its input.

use arrow::{
    array::{new_null_array, Array, ArrayRef, AsArray, Int64Array},
    compute::{cast_with_options, concat_batches, CastOptions},
    datatypes::{DataType, Field, FieldRef, Float64Type, Schema, SchemaRef},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;

/// A batch with no columns and no rows.
pub fn empty() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

pub fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

fn assemble(fields: Vec<FieldRef>, columns: Vec<ArrayRef>, rows: usize) -> Result<RecordBatch, ArrowError> {
    RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(rows)),
    )
}

/// Insert or replace a nullable column. A replaced column keeps its position.
pub fn set_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch, ArrowError> {
    let rows = if batch.num_columns() == 0 {
        array.len()
    } else {
        batch.num_rows()
    };
    let schema = batch.schema();
    let field: FieldRef = Arc::new(Field::new(name, array.data_type().clone(), true));
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut columns = batch.columns().to_vec();
    match schema.index_of(name) {
        Ok(i) => {
            fields[i] = field;
            columns[i] = array;
        }
        Err(_) => {
            fields.push(field);
            columns.push(array);
        }
    }
    assemble(fields, columns, rows)
}

pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch, ArrowError> {
    let keep: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !names.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();
    batch.project(&keep)
}

/// Move `first` (those present) to the front, in that order; the rest keep
/// their relative order. Repeated names count once.
pub fn reorder(batch: &RecordBatch, first: &[&str]) -> Result<RecordBatch, ArrowError> {
    let schema = batch.schema();
    let mut order: Vec<usize> = Vec::with_capacity(schema.fields().len());
    for name in first {
        if let Ok(i) = schema.index_of(name) {
            if !order.contains(&i) {
                order.push(i);
            }
        }
    }
    let rest: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !order.contains(i))
        .collect();
    order.extend(rest);
    batch.project(&order)
}

/// Integer view of a column. Whole numbers survive (`"2022.0"` → 2022);
/// fractions and anything unparseable become null.
pub fn to_int64(array: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    if array.data_type() == &DataType::Int64 {
        return Ok(Arc::clone(array));
    }
    let floats = cast_with_options(array, &DataType::Float64, &CastOptions::default())?;
    let ints: Int64Array = floats
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64))
        .collect();
    Ok(Arc::new(ints))
}

/// Cast with failed conversions turned into nulls instead of errors.
pub fn safe_cast(array: &ArrayRef, to: &DataType) -> Result<ArrayRef, ArrowError> {
    if array.data_type() == to {
        return Ok(Arc::clone(array));
    }
    if to == &DataType::Int64 {
        return to_int64(array);
    }
    let options = CastOptions {
        safe: true,
        ..Default::default()
    };
    cast_with_options(array, to, &options)
}

fn align(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch, ArrowError> {
    let rows = batch.num_rows();
    let columns = schema
        .fields()
        .iter()
        .map(|f| match batch.column_by_name(f.name()) {
            Some(col) => safe_cast(col, f.data_type()),
            None => Ok(new_null_array(f.data_type(), rows)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    RecordBatch::try_new_with_options(
        Arc::clone(schema),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(rows)),
    )
}

/// Stack batches vertically. Columns are the union in first-seen order;
/// rows missing a column get nulls. Type conflicts widen to text.
pub fn vstack(batches: &[RecordBatch]) -> Result<RecordBatch, ArrowError> {
    if batches.is_empty() {
        return Ok(empty());
    }
    let mut union: Vec<(String, DataType)> = Vec::new();
    for batch in batches {
        for field in batch.schema().fields() {
            match union.iter_mut().find(|(name, _)| name == field.name()) {
                Some((_, dtype)) if dtype != field.data_type() => *dtype = DataType::Utf8,
                Some(_) => {}
                None => union.push((field.name().clone(), field.data_type().clone())),
            }
        }
    }
    let schema: SchemaRef = Arc::new(Schema::new(
        union
            .into_iter()
            .map(|(name, dtype)| Field::new(name, dtype, true))
            .collect::<Vec<_>>(),
    ));
    let aligned = batches
        .iter()
        .map(|b| align(b, &schema))
        .collect::<Result<Vec<_>, _>>()?;
    concat_batches(&schema, &aligned)
}
