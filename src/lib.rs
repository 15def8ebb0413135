//! # Workout Ledger
//!
//! Structured workout logs (exercise -> ordered sets of reps/weight) kept in a
//! row-oriented, weakly typed cell store: a spreadsheet with one workspace per
//! trainee, one container (tab) per month and one row per set.
//!
//! ## Core Concepts
//!
//! - **Row Codec**: raw text rows <-> typed [`RowTuple`]s
//! - **Aggregator**: rows of one date -> grouped, sorted [`ExerciseRecord`]s
//! - **Key Scanner**: dates, months and workspaces for navigation
//! - **Reconciler**: in-place updates plus appends, never touching other rows
//! - **Gateways**: the only code doing range reads and writes
//!
//! ## Example
//!
//! ```ignore
//! use liftlog::{AccessToken, LedgerConfig, MemoryGateway, Session, WorkoutLedger};
//!
//! let gateway = MemoryGateway::new();
//! let folder = gateway.create_folder("fitness-tracker");
//! let alice = gateway.create_workspace(&folder, "Alice")?;
//!
//! let session = Session::with_token(AccessToken::new("token"));
//! let ledger = WorkoutLedger::new(gateway, session, LedgerConfig::default());
//!
//! let records = vec![ExerciseRecord::new("Bench Press").with_set(SetRecord::new(1, "10", "60"))];
//! ledger.save(&alice.id, "May 2024", "2024-05-01", &records)?;
//! assert_eq!(ledger.load(&alice.id, "May 2024", "2024-05-01")?, records);
//! ```

pub mod error;
pub mod gateway;
pub mod ledger;
pub mod range;
pub mod recognition;
pub mod reconcile;
pub mod records;
pub mod session;
pub mod types;

// Re-exports
pub use error::{ErrorKind, LedgerError, Result};
pub use gateway::{DiskGateway, DiskGatewayConfig, MemoryGateway, StoreGateway};
pub use ledger::{LedgerConfig, SaveReport, WorkoutLedger};
pub use range::RangeSpec;
pub use recognition::{RecognitionResponse, RecognizedExercise, RecognizedSet};
pub use reconcile::{reconcile, DuplicateKey, ReconcilePlan, RowUpdate};
pub use records::{
    aggregate, decode_row, encode_row, list_container_names, list_workspaces,
    unique_partition_keys, CellValue, InvalidRow,
};
pub use session::{AccessToken, Session, SessionState};
pub use types::*;
