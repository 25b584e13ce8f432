use crate::process::replace::{apply_replacements, apply_static_replacements};
use crate::process::utils::{column_index, replace_column, string_column};
use anyhow::Result;
use arrow::{
    array::{Array, ArrayRef, StringArray},
    record_batch::RecordBatch,
};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::debug;

/// Label kept as-is by the ethnicity binarization; everything else is Hispanic.
pub const NOT_HISPANIC: &str = "Not Hispanic";
pub const HISPANIC: &str = "Hispanic";

/// Full state name → USPS code, 50 states plus DC.
pub static US_STATE_CODES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Detailed race labels folded into the survey's coarser categories.
pub static RACE_COLLAPSE: &[(&str, &str)] = &[
    ("Black/African American/Negro", "Black, or African American"),
    ("Other Asian or Pacific Islander", "Pacific"),
    ("Japanese", "Asian"),
    ("Chinese", "Asian"),
    ("Other race, nec", "Some other race"),
    ("Two major races", "Some other race"),
    ("Three or more major races", "Some other race"),
];

pub fn harmonize_states(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    apply_static_replacements(batch, column, US_STATE_CODES)
}

pub fn harmonize_race(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    apply_static_replacements(batch, column, RACE_COLLAPSE)
}

/// Collapse the ethnicity column to `Hispanic` / `Not Hispanic`. The mapping
/// is built from the values actually present, so unexpected labels (and
/// unmapped raw codes) still end up as `Hispanic`. A missing value is not
/// `Not Hispanic` either, so it becomes `Hispanic` too.
pub fn binarize_ethnicity(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let sarr = string_column(batch, column)?;
    let present: BTreeSet<&str> = sarr.iter().flatten().collect();

    let remap: HashMap<String, String> = present
        .into_iter()
        .filter(|v| *v != NOT_HISPANIC)
        .map(|v| (v.to_string(), HISPANIC.to_string()))
        .collect();

    debug!(column, distinct = remap.len(), missing = sarr.null_count(), "binarizing ethnicity");
    let batch = apply_replacements(batch, column, &remap)?;
    if sarr.null_count() == 0 {
        return Ok(batch);
    }

    let idx = column_index(&batch, column)?;
    let filled: StringArray = string_column(&batch, column)?
        .iter()
        .map(|v| Some(v.unwrap_or(HISPANIC)))
        .collect();
    replace_column(&batch, idx, Arc::new(filled) as ArrayRef)
}

/// Column names the harmonizer works on.
#[derive(Debug, Clone, Copy)]
pub struct HarmonizeColumns<'a> {
    pub state: &'a str,
    pub race: &'a str,
    pub ethnicity: &'a str,
}

/// State codes, race collapsing, then ethnicity binarization.
pub fn harmonize(batch: &RecordBatch, cols: HarmonizeColumns<'_>) -> Result<RecordBatch> {
    let batch = harmonize_states(batch, cols.state)?;
    let batch = harmonize_race(&batch, cols.race)?;
    binarize_ethnicity(&batch, cols.ethnicity)
}
