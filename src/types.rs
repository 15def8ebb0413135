//! Core types for the workout ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One grid row: an ordered sequence of text cells.
pub type Row = Vec<String>;

/// Rectangular-ish store of text cells. Rows may be ragged.
pub type CellGrid = Vec<Row>;

/// Number of cells in an encoded row.
pub const ROW_WIDTH: usize = 5;

/// Column positions of the persisted row layout.
pub mod column {
    pub const DATE: usize = 0;
    pub const EXERCISE: usize = 1;
    pub const SET: usize = 2;
    pub const REPS: usize = 3;
    pub const WEIGHT: usize = 4;
}

/// One performed set. Reps and weight stay text so user input round-trips verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub set_number: u32,
    pub reps: String,
    pub weight: String,
}

impl SetRecord {
    pub fn new(set_number: u32, reps: impl Into<String>, weight: impl Into<String>) -> Self {
        Self {
            set_number,
            reps: reps.into(),
            weight: weight.into(),
        }
    }
}

/// All sets of one exercise within one partition.
///
/// `sets` is kept ascending by `set_number`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub exercise_name: String,
    pub sets: Vec<SetRecord>,
}

impl ExerciseRecord {
    /// Create an exercise with no sets.
    pub fn new(exercise_name: impl Into<String>) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            sets: Vec::new(),
        }
    }

    /// Add a set, keeping the ascending order.
    pub fn with_set(mut self, set: SetRecord) -> Self {
        self.sets.push(set);
        self.sort_sets();
        self
    }

    /// Stable sort by set number; equal set numbers keep their relative order.
    pub fn sort_sets(&mut self) {
        self.sets.sort_by_key(|s| s.set_number);
    }

    /// Next unused set number (max + 1).
    pub fn next_set_number(&self) -> u32 {
        self.sets.iter().map(|s| s.set_number).max().unwrap_or(0) + 1
    }
}

/// Logical primary key of a persisted row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub partition_key: String,
    pub exercise_name: String,
    pub set_number: u32,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/#{}",
            self.partition_key, self.exercise_name, self.set_number
        )
    }
}

/// The on-the-wire shape of one set plus its partition and exercise context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowTuple {
    pub partition_key: String,
    pub exercise_name: String,
    pub set_number: u32,
    pub reps: String,
    pub weight: String,
}

impl RowTuple {
    pub fn new(partition_key: &str, exercise_name: &str, set: &SetRecord) -> Self {
        Self {
            partition_key: partition_key.to_string(),
            exercise_name: exercise_name.to_string(),
            set_number: set.set_number,
            reps: set.reps.clone(),
            weight: set.weight.clone(),
        }
    }

    pub fn key(&self) -> RowKey {
        RowKey {
            partition_key: self.partition_key.clone(),
            exercise_name: self.exercise_name.clone(),
            set_number: self.set_number,
        }
    }

    pub fn to_set(&self) -> SetRecord {
        SetRecord::new(self.set_number, self.reps.clone(), self.weight.clone())
    }
}

/// A spreadsheet-like workspace (one per trainee).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub id: String,
    pub name: String,
}

/// Optimistic revision counter of one partition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rev({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
