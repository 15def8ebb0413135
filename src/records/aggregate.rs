//! Record aggregation: header-plus-rows grid -> exercise records of one date.

use super::codec::decode_row;
use crate::types::{ExerciseRecord, Row};
use std::collections::HashMap;

/// Counters collected while aggregating.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Data rows looked at (header excluded).
    pub rows_scanned: usize,
    /// Rows that failed to decode and were skipped.
    pub malformed: usize,
    /// Rows that landed in the output.
    pub matched: usize,
}

/// Group the rows of `partition_key` into exercise records.
///
/// Row 0 is the header. Malformed rows are skipped. Exercises come out in
/// first-seen order; sets ascend by set number and duplicates are kept.
pub fn aggregate(rows: &[Row], partition_key: &str) -> Vec<ExerciseRecord> {
    aggregate_with_stats(rows, partition_key).0
}

/// Like [`aggregate`], also reporting how many rows were skipped.
pub fn aggregate_with_stats(
    rows: &[Row],
    partition_key: &str,
) -> (Vec<ExerciseRecord>, AggregateStats) {
    let mut stats = AggregateStats::default();
    let mut records: Vec<ExerciseRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows.iter().skip(1) {
        stats.rows_scanned += 1;

        let tuple = match decode_row(row) {
            Ok(tuple) => tuple,
            Err(_) => {
                stats.malformed += 1;
                continue;
            }
        };

        if tuple.partition_key != partition_key {
            continue;
        }
        stats.matched += 1;

        let set = tuple.to_set();
        match positions.get(&tuple.exercise_name) {
            Some(&idx) => records[idx].sets.push(set),
            None => {
                positions.insert(tuple.exercise_name.clone(), records.len());
                records.push(ExerciseRecord {
                    exercise_name: tuple.exercise_name,
                    sets: vec![set],
                });
            }
        }
    }

    for record in &mut records {
        record.sort_sets();
    }

    if stats.malformed > 0 {
        tracing::warn!(
            partition = partition_key,
            malformed = stats.malformed,
            "skipped malformed rows while aggregating"
        );
    }
    tracing::debug!(
        partition = partition_key,
        scanned = stats.rows_scanned,
        matched = stats.matched,
        exercises = records.len(),
        "aggregated rows"
    );

    (records, stats)
}
