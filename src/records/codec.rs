//! Row codec: raw grid rows <-> typed row tuples.

use crate::types::{column, Row, RowTuple, ROW_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a row could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidRow {
    #[error("row has {cells} cells, need {}", ROW_WIDTH)]
    TooShort { cells: usize },

    #[error("set number '{0}' is not a positive integer")]
    BadSetNumber(String),

    #[error("exercise name is empty")]
    EmptyExercise,
}

/// Decode one grid row.
///
/// Cells past the fifth are ignored. The set number tolerates surrounding
/// whitespace; every other cell is taken verbatim.
pub fn decode_row(row: &[String]) -> Result<RowTuple, InvalidRow> {
    if row.len() < ROW_WIDTH {
        return Err(InvalidRow::TooShort { cells: row.len() });
    }

    let raw_set = &row[column::SET];
    let set_number = match raw_set.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err(InvalidRow::BadSetNumber(raw_set.clone())),
    };

    let exercise_name = &row[column::EXERCISE];
    if exercise_name.is_empty() {
        return Err(InvalidRow::EmptyExercise);
    }

    Ok(RowTuple {
        partition_key: row[column::DATE].clone(),
        exercise_name: exercise_name.clone(),
        set_number,
        reps: row[column::REPS].clone(),
        weight: row[column::WEIGHT].clone(),
    })
}

/// Encode a tuple as exactly five cells: date, exercise, set, reps, weight.
pub fn encode_row(tuple: &RowTuple) -> Row {
    vec![
        tuple.partition_key.clone(),
        tuple.exercise_name.clone(),
        tuple.set_number.to_string(),
        tuple.reps.clone(),
        tuple.weight.clone(),
    ]
}

/// A loosely typed cell value as produced by JSON-speaking collaborators.
///
/// Numbers are stringified, text passes through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}
