//! Navigation keys: dates inside a container, containers inside a workspace,
//! workspaces inside the root folder.

use crate::error::Result;
use crate::gateway::StoreGateway;
use crate::session::Session;
use crate::types::{Row, WorkspaceRef};
use std::collections::HashSet;

/// First cell of every row; rows with no cells yield an empty string.
pub fn first_column(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.first().cloned().unwrap_or_default())
        .collect()
}

/// Distinct partition keys of a date column, in first-occurrence order.
///
/// The first cell is the header and is dropped, as are empty cells.
pub fn unique_partition_keys<S: AsRef<str>>(column: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    column
        .iter()
        .skip(1)
        .map(AsRef::as_ref)
        .filter(|cell| !cell.is_empty())
        .filter(|cell| seen.insert(*cell))
        .map(str::to_string)
        .collect()
}

/// Container titles of a workspace, in the store's native order.
pub fn list_container_names<G: StoreGateway + ?Sized>(
    gateway: &G,
    session: &Session,
    workspace_id: &str,
) -> Result<Vec<String>> {
    gateway.list_containers(session, workspace_id)
}

/// Workspaces inside the folder named `root_folder` (exact, first match).
pub fn list_workspaces<G: StoreGateway + ?Sized>(
    gateway: &G,
    session: &Session,
    root_folder: &str,
) -> Result<Vec<WorkspaceRef>> {
    let folder_id = gateway.find_folder(session, root_folder)?;
    gateway.list_spreadsheets_in_folder(session, &folder_id)
}
