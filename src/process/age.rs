use crate::error::CleanError;
use crate::process::utils::{column_index, keep_rows, parse_code, replace_column, string_column};
use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray},
    compute::{cast_with_options, CastOptions},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MIN_AGE: f64 = 18.0;
pub const MAX_AGE: f64 = 93.0;

/// Band edges; band `i` covers `(AGE_BOUNDS[i], AGE_BOUNDS[i + 1]]`, and the
/// first band also takes `AGE_BOUNDS[0]` itself.
pub const AGE_BOUNDS: [f64; 8] = [18.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 93.0];
pub const AGE_LABELS: [&str; 7] = ["18-30", "31-40", "41-50", "51-60", "61-70", "71-80", "81-93"];

/// Label of the band holding `age`, if any.
pub fn age_band(age: f64) -> Option<&'static str> {
    if age == AGE_BOUNDS[0] {
        return Some(AGE_LABELS[0]);
    }
    AGE_BOUNDS
        .windows(2)
        .position(|w| age > w[0] && age <= w[1])
        .map(|i| AGE_LABELS[i])
}

/// Ages as floats. Text that does not parse as a number is an error, not a
/// missing value.
fn age_values(batch: &RecordBatch, column: &str) -> Result<Float64Array> {
    let idx = column_index(batch, column)?;
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    let floats = cast_with_options(batch.column(idx), &DataType::Float64, &strict)
        .map_err(CleanError::from)
        .with_context(|| format!("casting {column} to a number"))?;
    floats
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| CleanError::Schema(format!("column {column} is not numeric")).into())
}

/// Keep rows with `MIN_AGE <= age <= MAX_AGE`. Missing ages are dropped.
pub fn filter_age_range(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let ages = age_values(batch, column)?;
    let mask: BooleanArray = ages
        .iter()
        .map(|a| Some(matches!(a, Some(a) if (MIN_AGE..=MAX_AGE).contains(&a))))
        .collect();
    keep_rows(batch, &mask)
}

/// Replace numeric ages with their band label. Ages outside every band
/// become null.
pub fn bucketize_age(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let idx = column_index(batch, column)?;
    let ages = age_values(batch, column)?;
    let bands: StringArray = ages.iter().map(|a| a.and_then(age_band)).collect();
    debug!(column, unbanded = bands.null_count(), "bucketized ages");
    replace_column(batch, idx, Arc::new(bands) as ArrayRef)
}

/// Drop rows holding a null anywhere, or a bare integer code in one of the
/// `categorical` columns (a code the dictionary had no label for).
pub fn drop_missing(batch: &RecordBatch, categorical: &[&str]) -> Result<RecordBatch> {
    let mut keep = vec![true; batch.num_rows()];

    for col in batch.columns() {
        if col.null_count() == 0 {
            continue;
        }
        for (row, k) in keep.iter_mut().enumerate() {
            if col.is_null(row) {
                *k = false;
            }
        }
    }

    let mut unmapped = 0usize;
    for name in categorical {
        let sarr = string_column(batch, name)?;
        for (row, v) in sarr.iter().enumerate() {
            if keep[row] && v.and_then(parse_code).is_some() {
                keep[row] = false;
                unmapped += 1;
            }
        }
    }
    if unmapped > 0 {
        warn!(rows = unmapped, "dropping rows with codes missing from the dictionary");
    }

    keep_rows(batch, &BooleanArray::from(keep))
}

/// Range filter, banding, then the missing-value sweep.
pub fn finish_age(batch: &RecordBatch, column: &str, categorical: &[&str]) -> Result<RecordBatch> {
    let in_range = filter_age_range(batch, column)?;
    let banded = bucketize_age(&in_range, column)?;
    drop_missing(&banded, categorical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::Int64Array,
        datatypes::{Field, Schema},
    };

    fn batch(ages: Vec<Option<i64>>, sexes: Vec<Option<&str>>) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("AGE", DataType::Int64, true),
            Field::new("SEX", DataType::Utf8, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(ages)),
                Arc::new(StringArray::from(sexes)),
            ],
        )
        .unwrap()
    }

    fn labels(batch: &RecordBatch) -> Vec<Option<String>> {
        batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn boundary_ages_land_in_expected_bands() {
        assert_eq!(age_band(17.0), None);
        assert_eq!(age_band(18.0), Some("18-30"));
        assert_eq!(age_band(30.0), Some("18-30"));
        assert_eq!(age_band(31.0), Some("31-40"));
        assert_eq!(age_band(40.0), Some("31-40"));
        assert_eq!(age_band(80.0), Some("71-80"));
        assert_eq!(age_band(81.0), Some("81-93"));
        assert_eq!(age_band(93.0), Some("81-93"));
        assert_eq!(age_band(94.0), None);
    }

    #[test]
    fn bands_are_monotonic_and_cover_adult_range() {
        let mut last = 0;
        for age in 18..=93 {
            let label = age_band(age as f64).expect("adult age must have a band");
            let pos = AGE_LABELS.iter().position(|l| *l == label).unwrap();
            assert!(pos >= last, "band went backwards at {age}");
            last = pos;
        }
        assert_eq!(last, AGE_LABELS.len() - 1);
    }

    #[test]
    fn out_of_range_ages_are_removed() -> Result<()> {
        let b = batch(
            vec![Some(17), Some(18), Some(93), Some(94), None],
            vec![Some("Male"); 5],
        );
        let out = filter_age_range(&b, "AGE")?;
        let ages = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ages.values().to_vec(), vec![18, 93]);
        Ok(())
    }

    #[test]
    fn age_eighteen_survives_the_whole_step() -> Result<()> {
        let b = batch(vec![Some(18)], vec![Some("Female")]);
        let out = finish_age(&b, "AGE", &["SEX"])?;
        assert_eq!(labels(&out), vec![Some("18-30".to_string())]);
        Ok(())
    }

    #[test]
    fn unmapped_codes_and_nulls_are_dropped() -> Result<()> {
        let b = batch(
            vec![Some(25), Some(35), Some(45), Some(55)],
            vec![Some("Male"), Some("9"), None, Some("Female")],
        );
        let out = finish_age(&b, "AGE", &["SEX"])?;
        assert_eq!(
            labels(&out),
            vec![Some("18-30".to_string()), Some("51-60".to_string())]
        );
        Ok(())
    }

    #[test]
    fn non_numeric_age_is_table_error() {
        let schema = Schema::new(vec![Field::new("AGE", DataType::Utf8, true)]);
        let b = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec![Some("34"), Some("forty"), None]))],
        )
        .unwrap();
        let err = filter_age_range(&b, "AGE").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::Table(_))
        ));
        assert!(format!("{err:#}").contains("AGE"));
    }

    #[test]
    fn numeric_text_ages_are_accepted() -> Result<()> {
        let schema = Schema::new(vec![Field::new("AGE", DataType::Utf8, true)]);
        let b = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec![Some("34"), None, Some("17")]))],
        )?;
        let out = filter_age_range(&b, "AGE")?;
        assert_eq!(out.num_rows(), 1);
        Ok(())
    }

    #[test]
    fn fractional_ages_are_banded() -> Result<()> {
        let schema = Schema::new(vec![Field::new("AGE", DataType::Float64, true)]);
        let b = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![18.5, 30.5]))],
        )?;
        let out = bucketize_age(&b, "AGE")?;
        assert_eq!(
            labels(&out),
            vec![Some("18-30".to_string()), Some("31-40".to_string())]
        );
        Ok(())
    }
}
