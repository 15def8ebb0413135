//! Error types for the workout ledger.

use thiserror::Error;

/// Main error type for ledger and gateway operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store session not initialized")]
    NotInitialized,

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Store session has been revoked")]
    SessionRevoked,

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Container already exists: {0}")]
    ContainerExists(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Revision conflict on {partition}: expected {expected}, found {found}")]
    Conflict {
        partition: String,
        expected: u64,
        found: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Invalid store format: {0}")]
    InvalidFormat(String),

    #[error("Store is locked by another process")]
    Locked,
}

/// Coarse classification a UI layer can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    NotFound,
    Malformed,
    UpstreamFailure,
    Unauthenticated,
    Conflict,
}

impl LedgerError {
    /// Map this error onto the coarse taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotInitialized => ErrorKind::NotInitialized,
            LedgerError::Unauthenticated(_) | LedgerError::SessionRevoked => {
                ErrorKind::Unauthenticated
            }
            LedgerError::FolderNotFound(_)
            | LedgerError::WorkspaceNotFound(_)
            | LedgerError::ContainerNotFound(_)
            | LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidRange(_)
            | LedgerError::InvalidRecord(_)
            | LedgerError::Deserialization(_)
            | LedgerError::ChecksumMismatch { .. }
            | LedgerError::InvalidFormat(_) => ErrorKind::Malformed,
            LedgerError::Conflict { .. } => ErrorKind::Conflict,
            LedgerError::Io(_)
            | LedgerError::ContainerExists(_)
            | LedgerError::UpstreamFailure(_)
            | LedgerError::Serialization(_)
            | LedgerError::Locked => ErrorKind::UpstreamFailure,
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for LedgerError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for LedgerError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        LedgerError::Deserialization(e.to_string())
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
