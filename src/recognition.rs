//! Mapping of image-recognition results into exercise records.
//!
//! The recognition service answers with JSON like
//! `{"exercises": [{"name": "Squat", "sets": [{"reps": 5, "weight": 100}]}]}`
//! or `{"error": "..."}`. Set numbers are not part of the payload; they are
//! assigned from position.

use crate::error::{LedgerError, Result};
use crate::records::CellValue;
use crate::types::{ExerciseRecord, SetRecord};
use serde::{Deserialize, Serialize};

/// One recognized set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSet {
    pub reps: CellValue,
    pub weight: CellValue,
}

/// One recognized exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedExercise {
    pub name: String,
    #[serde(default)]
    pub sets: Vec<RecognizedSet>,
}

/// Body returned by the recognition service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub exercises: Option<Vec<RecognizedExercise>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RecognitionResponse {
    /// Parse a raw response body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| LedgerError::Deserialization(e.to_string()))
    }

    /// Convert into exercise records, numbering sets from 1 in payload order.
    pub fn into_records(self) -> Result<Vec<ExerciseRecord>> {
        if let Some(error) = self.error {
            return Err(LedgerError::UpstreamFailure(error));
        }

        Ok(self
            .exercises
            .unwrap_or_default()
            .into_iter()
            .filter(|exercise| !exercise.name.is_empty())
            .map(RecognizedExercise::into_record)
            .collect())
    }
}

impl RecognizedExercise {
    pub fn into_record(self) -> ExerciseRecord {
        self.sets
            .iter()
            .fold(ExerciseRecord::new(self.name), |record, set| {
                let number = record.next_set_number();
                record.with_set(SetRecord::new(number, set.reps.to_text(), set.weight.to_text()))
            })
    }
}
