// src/process/mod.rs
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, UInt64Array},
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder, WriterBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::File,
    io::{Seek, SeekFrom},
    path::Path,
    sync::Arc,
};
use tracing::{debug, info};

use crate::error::CleanError;
use crate::process::utils::column_index;

pub mod age;
pub mod harmonize;
pub mod recode;
pub mod replace;
pub mod utils;

/// Header of the leading index column (left blank, like a dataframe index).
pub const INDEX_COLUMN: &str = "";

/// Read a delimited file with a header row into a single batch. Column types
/// are inferred from the whole file. An index column holding each row's
/// position in the file is prepended.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| CleanError::io(path, e))
        .with_context(|| format!("Failed to open data set {:?}", path))?;

    let format = Format::default().with_header(true);
    let (schema, records) = format
        .infer_schema(&mut file, None)
        .map_err(CleanError::from)
        .with_context(|| format!("Failed to infer schema of {:?}", path))?;
    debug!(columns = schema.fields().len(), records, "inferred schema");

    file.seek(SeekFrom::Start(0))
        .map_err(|e| CleanError::io(path, e))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(file)
        .map_err(CleanError::from)?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(CleanError::from)
        .with_context(|| format!("CSV parse error in {:?}", path))?;
    let table = concat_batches(&schema, &batches).map_err(CleanError::from)?;

    info!(rows = table.num_rows(), "loaded data set");
    with_row_index(&table)
}

/// Prepend [`INDEX_COLUMN`] numbering the rows from zero.
pub fn with_row_index(batch: &RecordBatch) -> Result<RecordBatch> {
    let index: UInt64Array = (0..batch.num_rows() as u64).collect();

    let mut fields = vec![Field::new(INDEX_COLUMN, DataType::UInt64, false)];
    fields.extend(batch.schema().fields().iter().map(|f| f.as_ref().clone()));

    let mut cols: Vec<ArrayRef> = vec![Arc::new(index)];
    cols.extend(batch.columns().iter().cloned());

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols)
        .map_err(CleanError::from)
        .map_err(Into::into)
}

/// Keep the index column plus `columns`, in that order.
pub fn project(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch> {
    let mut indices = Vec::with_capacity(columns.len() + 1);
    if let Ok(idx) = batch.schema().index_of(INDEX_COLUMN) {
        indices.push(idx);
    }
    for name in columns {
        indices.push(column_index(batch, name)?);
    }
    batch
        .project(&indices)
        .map_err(CleanError::from)
        .map_err(Into::into)
}

/// Rename columns via `(from, to)` pairs; unlisted columns keep their names.
pub fn rename(batch: &RecordBatch, names: &[(&str, &str)]) -> Result<RecordBatch> {
    let fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| {
            match names.iter().find(|(from, _)| f.name().as_str() == *from) {
                Some((_, to)) => f.as_ref().clone().with_name(*to),
                None => f.as_ref().clone(),
            }
        })
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), batch.columns().to_vec())
        .map_err(CleanError::from)
        .map_err(Into::into)
}

/// Write the batch as comma-separated text with a header row.
#[tracing::instrument(level = "info", skip(batch, path), fields(path = %path.as_ref().display()))]
pub fn write_table<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| CleanError::io(path, e))
        .with_context(|| format!("Failed to create {:?}", path))?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .map_err(CleanError::from)
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!(rows = batch.num_rows(), "wrote cleaned table");
    Ok(())
}
