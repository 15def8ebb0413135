//! Row-level decoding and read-path reconstruction.
//!
//! Rows come from the store as untyped text cells; everything above this
//! module works on typed [`RowTuple`](crate::types::RowTuple)s and
//! [`ExerciseRecord`](crate::types::ExerciseRecord)s.

mod aggregate;
mod codec;
mod keys;

pub use aggregate::{aggregate, aggregate_with_stats, AggregateStats};
pub use codec::{decode_row, encode_row, CellValue, InvalidRow};
pub use keys::{first_column, list_container_names, list_workspaces, unique_partition_keys};
