// src/pipeline.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::error::CleanError;
use crate::keys;
use crate::process::{
    self,
    age::finish_age,
    harmonize::{harmonize, HarmonizeColumns},
    recode::clean_col,
};

pub const PERWT: &str = "PERWT";
pub const SEX: &str = "SEX";
pub const AGE: &str = "AGE";
pub const RACE: &str = "RACE";
pub const HISPAN: &str = "HISPAN";
pub const STATEICP: &str = "STATEICP";

/// Columns kept from the raw extract, in output order.
pub const SELECTED_COLUMNS: [&str; 6] = [PERWT, SEX, AGE, RACE, HISPAN, STATEICP];

/// Recoded columns, in the order their blocks appear in the code dictionary.
pub const RECODED_COLUMNS: [&str; 4] = [STATEICP, SEX, RACE, HISPAN];

pub const OUTPUT_NAMES: [(&str, &str); 6] = [
    (SEX, "gender"),
    (AGE, "age"),
    (RACE, "race_ethnicity"),
    (HISPAN, "hispanic"),
    (STATEICP, "state"),
    (PERWT, "perwt"),
];

/// Row counts of a finished run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub output: PathBuf,
}

/// Load, recode, harmonize, bucketize, rename, and write.
#[tracing::instrument(level = "info", skip(config), fields(data = %config.data.display()))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let raw = process::load_table(&config.data)?;
    let rows_read = raw.num_rows();
    let mut table = process::project(&raw, &SELECTED_COLUMNS)?;

    let blocks = keys::load_blocks(&config.keys_path)?;
    if blocks.len() < RECODED_COLUMNS.len() {
        return Err(CleanError::Parse {
            block: blocks.len(),
            line: String::new(),
            reason: format!(
                "code dictionary has {} blocks, {} needed",
                blocks.len(),
                RECODED_COLUMNS.len()
            ),
        }
        .into());
    }

    for (i, col) in RECODED_COLUMNS.iter().enumerate() {
        table = clean_col(&table, col, i, &blocks[i])
            .with_context(|| format!("recoding {col}"))?;
    }
    info!("recoded {} columns", RECODED_COLUMNS.len());

    let table = harmonize(
        &table,
        HarmonizeColumns {
            state: STATEICP,
            race: RACE,
            ethnicity: HISPAN,
        },
    )?;
    let table = finish_age(&table, AGE, &RECODED_COLUMNS)?;
    let table = process::rename(&table, &OUTPUT_NAMES)?;

    process::write_table(&table, &config.csv_name)?;

    let summary = RunSummary {
        rows_read,
        rows_written: table.num_rows(),
        rows_dropped: rows_read - table.num_rows(),
        output: config.csv_name.clone(),
    };
    info!(
        summary = %serde_json::to_string(&summary).unwrap_or_default(),
        "cleaning finished"
    );
    Ok(summary)
}
