//! Store gateways: the only code that touches the backing cell store.
//!
//! The store is an addressable 2-D grid of text cells per container, grouped
//! into workspaces, which live in folders. It offers range reads, range
//! overwrites, bulk appends and container creation; nothing more.
//!
//! - [`MemoryGateway`]: process-local store, with failure injection for tests
//! - [`DiskGateway`]: persistent store in a directory, one file per workspace

mod disk;
mod grid;
mod memory;

pub use disk::{DiskGateway, DiskGatewayConfig};
pub use grid::{Catalog, Container, Folder, Workspace};
pub use memory::MemoryGateway;

use crate::error::Result;
use crate::range::RangeSpec;
use crate::session::Session;
use crate::types::{CellGrid, Row, WorkspaceRef};

/// Range-level access to the backing store.
///
/// Every call takes the session explicitly and fails with
/// `NotInitialized`/`SessionRevoked`/`Unauthenticated` before doing any I/O
/// when the session is not usable.
pub trait StoreGateway {
    /// Values inside `range`. An empty range reads as `[]`.
    fn read_range(&self, session: &Session, workspace_id: &str, range: &RangeSpec)
        -> Result<CellGrid>;

    /// Overwrite the rectangle covered by `range`.
    fn write_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()>;

    /// Add rows after the last populated row of `range`.
    fn append_rows(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()>;

    /// Create an empty container. Fails if the title is taken.
    fn create_container(&self, session: &Session, workspace_id: &str, title: &str) -> Result<()>;

    /// Container titles in native order.
    fn list_containers(&self, session: &Session, workspace_id: &str) -> Result<Vec<String>>;

    /// Id of the first folder named exactly `name`.
    fn find_folder(&self, session: &Session, name: &str) -> Result<String>;

    /// Workspaces inside a folder.
    fn list_spreadsheets_in_folder(
        &self,
        session: &Session,
        folder_id: &str,
    ) -> Result<Vec<WorkspaceRef>>;
}

impl<G: StoreGateway + ?Sized> StoreGateway for &G {
    fn read_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
    ) -> Result<CellGrid> {
        (**self).read_range(session, workspace_id, range)
    }

    fn write_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        (**self).write_range(session, workspace_id, range, rows)
    }

    fn append_rows(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        (**self).append_rows(session, workspace_id, range, rows)
    }

    fn create_container(&self, session: &Session, workspace_id: &str, title: &str) -> Result<()> {
        (**self).create_container(session, workspace_id, title)
    }

    fn list_containers(&self, session: &Session, workspace_id: &str) -> Result<Vec<String>> {
        (**self).list_containers(session, workspace_id)
    }

    fn find_folder(&self, session: &Session, name: &str) -> Result<String> {
        (**self).find_folder(session, name)
    }

    fn list_spreadsheets_in_folder(
        &self,
        session: &Session,
        folder_id: &str,
    ) -> Result<Vec<WorkspaceRef>> {
        (**self).list_spreadsheets_in_folder(session, folder_id)
    }
}

/// Derive a short stable id from a parent id, a name and a nonce.
pub(crate) fn derive_id(prefix: &str, parent: &str, name: &str, nonce: u64) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(parent.as_bytes());
    hasher.update([0u8]);
    hasher.update(name.as_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    format!("{}-{}", prefix, hex::encode(&digest[..8]))
}
