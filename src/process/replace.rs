use crate::process::utils::{column_index, replace_column, string_column};
use anyhow::Result;
use arrow::{
    array::{ArrayRef, StringArray},
    record_batch::RecordBatch,
};
use std::{collections::HashMap, sync::Arc};

/// Substitute whole-cell values of one column. Values without an entry are
/// left as they are; nulls stay null.
pub fn apply_replacements(
    batch: &RecordBatch,
    column: &str,
    replacements: &HashMap<String, String>,
) -> Result<RecordBatch> {
    let idx = column_index(batch, column)?;
    if replacements.is_empty() {
        return Ok(batch.clone());
    }

    let sarr = string_column(batch, column)?;
    let replaced: StringArray = sarr
        .iter()
        .map(|opt| opt.map(|v| replacements.get(v).map_or(v, String::as_str)))
        .collect();

    replace_column(batch, idx, Arc::new(replaced) as ArrayRef)
}

/// Same as [`apply_replacements`] for a fixed `&'static` table.
pub fn apply_static_replacements(
    batch: &RecordBatch,
    column: &str,
    table: &[(&str, &str)],
) -> Result<RecordBatch> {
    let replacements: HashMap<String, String> = table
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    apply_replacements(batch, column, &replacements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema};

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![Field::new("RACE", DataType::Utf8, true)]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec![
                Some("Japanese"),
                Some("White"),
                None,
            ]))],
        )
        .unwrap()
    }

    #[test]
    fn replaces_listed_values_only() -> Result<()> {
        let out = apply_static_replacements(&batch(), "RACE", &[("Japanese", "Asian")])?;
        let col = out
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(col.value(0), "Asian");
        assert_eq!(col.value(1), "White");
        assert!(arrow::array::Array::is_null(col, 2));
        Ok(())
    }

    #[test]
    fn unknown_column_fails() {
        assert!(apply_static_replacements(&batch(), "SEX", &[("a", "b")]).is_err());
    }
}
