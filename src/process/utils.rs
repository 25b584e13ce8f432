use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, StringArray},
    compute::{cast, filter_record_batch},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::CleanError;

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read a cell as an integer category code. Integral floats (`2.0`) count,
/// anything else does not.
pub fn parse_code(raw: &str) -> Option<i64> {
    let s = clean_str(raw);
    if let Ok(code) = s.parse::<i64>() {
        return Some(code);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Index of `name` in the batch schema, as a schema error when absent.
pub fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| CleanError::Schema(format!("missing column {name}")))
        .map_err(Into::into)
}

/// The named column rendered as text, whatever its inferred type was.
pub fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let idx = column_index(batch, name)?;
    let utf8 = cast(batch.column(idx), &DataType::Utf8)
        .map_err(CleanError::from)
        .with_context(|| format!("casting {name} to text"))?;
    utf8.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| CleanError::Schema(format!("column {name} is not text after cast")).into())
}

/// Swap column `idx` for `array`, retyping the field to match.
pub fn replace_column(batch: &RecordBatch, idx: usize, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<_> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields[idx] = fields[idx]
        .clone()
        .with_data_type(array.data_type().clone());

    let mut cols = batch.columns().to_vec();
    cols[idx] = array;

    RecordBatch::try_new(Arc::new(arrow::datatypes::Schema::new(fields)), cols)
        .map_err(CleanError::from)
        .map_err(Into::into)
}

/// Keep only the rows where `mask` is true.
pub fn keep_rows(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    filter_record_batch(batch, mask)
        .map_err(CleanError::from)
        .context("Failed to apply boolean filter to columns")
}
