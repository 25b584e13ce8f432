use crate::error::CleanError;
use crate::process::utils::{column_index, parse_code, replace_column, string_column};
use anyhow::Result;
use arrow::{
    array::{ArrayRef, StringArray},
    record_batch::RecordBatch,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

/// Code and label are separated by tabs or by a run of two or more spaces.
/// Only the first such run splits; the label keeps any spacing after it.
static CODE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t+| {2,}").unwrap());

/// Build `code → label` from one dictionary block. The first line is the
/// block header and is skipped, as are blank lines.
pub fn parse_block(block_index: usize, block: &str) -> Result<HashMap<i64, String>, CleanError> {
    let mut codes = HashMap::new();

    for line in block.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = CODE_SEPARATOR.splitn(line.trim(), 2).map(str::trim).collect();

        let [code, label] = fields.as_slice() else {
            return Err(CleanError::Parse {
                block: block_index,
                line: line.to_string(),
                reason: "expected a code and a label".to_string(),
            });
        };

        let code = code.parse::<i64>().map_err(|e| CleanError::Parse {
            block: block_index,
            line: line.to_string(),
            reason: format!("code is not an integer: {e}"),
        })?;
        codes.insert(code, label.to_string());
    }

    Ok(codes)
}

/// Replace integer codes in `column` with their labels. Codes without a label
/// are kept as they were.
pub fn recode_column(
    batch: &RecordBatch,
    column: &str,
    codes: &HashMap<i64, String>,
) -> Result<RecordBatch> {
    let idx = column_index(batch, column)?;
    let sarr = string_column(batch, column)?;

    let mut unmapped = 0usize;
    let recoded: StringArray = sarr
        .iter()
        .map(|opt| {
            opt.map(|raw| match parse_code(raw).and_then(|c| codes.get(&c)) {
                Some(label) => label.as_str(),
                None => {
                    unmapped += 1;
                    raw
                }
            })
        })
        .collect();

    debug!(column, labels = codes.len(), unmapped, "recoded column");
    replace_column(batch, idx, Arc::new(recoded) as ArrayRef)
}

/// Parse `block` and recode `column` with it.
pub fn clean_col(
    batch: &RecordBatch,
    column: &str,
    block_index: usize,
    block: &str,
) -> Result<RecordBatch> {
    let codes = parse_block(block_index, block)?;
    recode_column(batch, column, &codes)
}
