//! Write-path reconciliation.
//!
//! The store has no keys, no upsert and no transactions, so a save is a diff
//! computed against a fresh read: rows whose `(date, exercise, set)` already
//! exist are rewritten in place, everything else is appended. Rows the new
//! records do not name are never touched.
//!
//! The logical primary key is [`RowKey`]. When the store already holds the same
//! key on several rows, the first row (positional scan) receives the update and
//! the others are reported in [`ReconcilePlan::duplicates`].

use crate::records::{decode_row, encode_row};
use crate::types::{CellGrid, ExerciseRecord, Row, RowKey, RowTuple, ROW_WIDTH};
use std::collections::HashMap;

/// Grid row number (1-based) of the first data row; row 1 holds the header.
pub const FIRST_DATA_ROW: u32 = 2;

/// In-place rewrite of an existing row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowUpdate {
    /// Index into the header-less existing rows.
    pub row_index: usize,
    pub tuple: RowTuple,
}

impl RowUpdate {
    /// 1-based row number in the container, header included.
    pub fn sheet_row(&self) -> u32 {
        self.row_index as u32 + FIRST_DATA_ROW
    }
}

/// A logical key held by more than one existing row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: RowKey,
    /// Every row index carrying the key, ascending. The first one is updated.
    pub row_indices: Vec<usize>,
}

/// Result of diffing new records against existing rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub updates: Vec<RowUpdate>,
    pub appends: Vec<RowTuple>,
    /// Sets whose stored row already holds the same reps and weight.
    pub unchanged: usize,
    pub duplicates: Vec<DuplicateKey>,
}

impl ReconcilePlan {
    /// True when applying the plan would not change the store.
    pub fn is_noop(&self) -> bool {
        self.updates.is_empty() && self.appends.is_empty()
    }

    /// Encoded rows to append, in order.
    pub fn append_rows(&self) -> Vec<Row> {
        self.appends.iter().map(encode_row).collect()
    }

    /// Apply the plan to a header-less grid held in memory.
    ///
    /// Cells beyond the fifth column of an updated row are preserved.
    pub fn apply_to(&self, rows: &mut CellGrid) {
        for update in &self.updates {
            if let Some(row) = rows.get_mut(update.row_index) {
                let tail = row.split_off(row.len().min(ROW_WIDTH));
                *row = encode_row(&update.tuple);
                row.extend(tail);
            }
        }
        rows.extend(self.append_rows());
    }
}

/// Diff `new_records` for `partition_key` against `existing_rows`.
///
/// `existing_rows` must not include the header. Never fails; rows that do not
/// decode are never matched and never touched.
pub fn reconcile(
    existing_rows: &[Row],
    new_records: &[ExerciseRecord],
    partition_key: &str,
) -> ReconcilePlan {
    // Positional index of this partition's rows; the first entry wins.
    let mut index: HashMap<RowKey, Vec<(usize, RowTuple)>> = HashMap::new();
    for (row_index, row) in existing_rows.iter().enumerate() {
        if let Ok(tuple) = decode_row(row) {
            if tuple.partition_key == partition_key {
                index.entry(tuple.key()).or_default().push((row_index, tuple));
            }
        }
    }

    // Repeated keys collapse first: the last value wins, the first position stays.
    let mut wanted: Vec<RowTuple> = Vec::new();
    let mut positions: HashMap<RowKey, usize> = HashMap::new();
    for record in new_records {
        for set in &record.sets {
            let tuple = RowTuple::new(partition_key, &record.exercise_name, set);
            match positions.get(&tuple.key()) {
                Some(&pos) => wanted[pos] = tuple,
                None => {
                    positions.insert(tuple.key(), wanted.len());
                    wanted.push(tuple);
                }
            }
        }
    }

    let mut plan = ReconcilePlan::default();
    for tuple in wanted {
        let key = tuple.key();
        let Some(matches) = index.get(&key) else {
            plan.appends.push(tuple);
            continue;
        };
        let (row_index, existing) = &matches[0];

        if matches.len() > 1 {
            tracing::warn!(
                key = %key,
                rows = matches.len(),
                "duplicate logical key in store; updating first row only"
            );
            plan.duplicates.push(DuplicateKey {
                key,
                row_indices: matches.iter().map(|(i, _)| *i).collect(),
            });
        }

        let mut updated = existing.clone();
        updated.reps = tuple.reps;
        updated.weight = tuple.weight;

        if updated == *existing {
            plan.unchanged += 1;
        } else {
            plan.updates.push(RowUpdate {
                row_index: *row_index,
                tuple: updated,
            });
        }
    }

    tracing::debug!(
        partition = partition_key,
        existing = existing_rows.len(),
        updates = plan.updates.len(),
        appends = plan.appends.len(),
        unchanged = plan.unchanged,
        "reconciled records"
    );

    plan
}
