//! Process-local gateway.

use super::grid::{Catalog, Folder, Workspace};
use super::{derive_id, StoreGateway};
use crate::error::{LedgerError, Result};
use crate::range::RangeSpec;
use crate::session::Session;
use crate::types::{CellGrid, Row, WorkspaceRef};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway over an in-memory store.
///
/// Besides serving tests, it can simulate upstream trouble: a required token
/// (anything else is `Unauthenticated`) and a budget of successful writes
/// after which every write fails with `UpstreamFailure`.
pub struct MemoryGateway {
    catalog: RwLock<Catalog>,
    workspaces: RwLock<HashMap<String, Workspace>>,
    required_token: Option<String>,
    write_budget: Mutex<Option<usize>>,
    write_calls: AtomicU64,
    append_calls: AtomicU64,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            workspaces: RwLock::new(HashMap::new()),
            required_token: None,
            write_budget: Mutex::new(None),
            write_calls: AtomicU64::new(0),
            append_calls: AtomicU64::new(0),
        }
    }

    /// Reject any session whose token differs from `token`.
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }

    /// Allow `writes` more successful writes/appends, then fail every one.
    /// `None` lifts the limit.
    pub fn set_write_budget(&self, writes: Option<usize>) {
        *self.write_budget.lock() = writes;
    }

    /// Number of `write_range` calls that succeeded.
    pub fn write_calls(&self) -> u64 {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Number of `append_rows` calls that succeeded.
    pub fn append_calls(&self) -> u64 {
        self.append_calls.load(Ordering::SeqCst)
    }

    /// Create a folder (duplicate names are allowed, as in the real store).
    pub fn create_folder(&self, name: &str) -> String {
        let mut catalog = self.catalog.write();
        let nonce = catalog.take_nonce();
        let id = derive_id("folder", "", name, nonce);
        catalog.folders.push(Folder {
            id: id.clone(),
            name: name.to_string(),
            workspaces: Vec::new(),
        });
        id
    }

    /// Create an empty workspace inside a folder.
    pub fn create_workspace(&self, folder_id: &str, name: &str) -> Result<WorkspaceRef> {
        let mut catalog = self.catalog.write();
        let nonce = catalog.take_nonce();
        let folder = catalog.folder_by_id_mut(folder_id)?;

        let workspace = Workspace::new(derive_id("ws", folder_id, name, nonce), name);
        let reference = workspace.reference();
        folder.workspaces.push(reference.clone());
        self.workspaces
            .write()
            .insert(workspace.id.clone(), workspace);
        Ok(reference)
    }

    /// Copy of the full grid of a container, for inspection.
    pub fn snapshot(&self, workspace_id: &str, title: &str) -> Result<CellGrid> {
        let workspaces = self.workspaces.read();
        let workspace = workspaces
            .get(workspace_id)
            .ok_or_else(|| LedgerError::WorkspaceNotFound(workspace_id.to_string()))?;
        Ok(workspace.container(title)?.rows.clone())
    }

    fn authorize(&self, session: &Session) -> Result<()> {
        let token = session.ready()?;
        match &self.required_token {
            Some(required) if required != token.as_str() => Err(LedgerError::Unauthenticated(
                "access token rejected".into(),
            )),
            _ => Ok(()),
        }
    }

    fn spend_write(&self) -> Result<()> {
        let mut budget = self.write_budget.lock();
        match budget.as_mut() {
            Some(0) => Err(LedgerError::UpstreamFailure(
                "simulated upstream write failure".into(),
            )),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn with_workspace<T>(
        &self,
        workspace_id: &str,
        f: impl FnOnce(&mut Workspace) -> Result<T>,
    ) -> Result<T> {
        let mut workspaces = self.workspaces.write();
        let workspace = workspaces
            .get_mut(workspace_id)
            .ok_or_else(|| LedgerError::WorkspaceNotFound(workspace_id.to_string()))?;
        f(workspace)
    }
}

impl StoreGateway for MemoryGateway {
    fn read_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
    ) -> Result<CellGrid> {
        self.authorize(session)?;
        let workspaces = self.workspaces.read();
        let workspace = workspaces
            .get(workspace_id)
            .ok_or_else(|| LedgerError::WorkspaceNotFound(workspace_id.to_string()))?;
        Ok(workspace.container(&range.container)?.read(range))
    }

    fn write_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        self.authorize(session)?;
        self.spend_write()?;
        self.with_workspace(workspace_id, |ws| {
            ws.container_mut(&range.container)?.write(range, rows)
        })?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn append_rows(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        self.authorize(session)?;
        self.spend_write()?;
        self.with_workspace(workspace_id, |ws| {
            ws.container_mut(&range.container)?.append(range, rows)
        })?;
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn create_container(&self, session: &Session, workspace_id: &str, title: &str) -> Result<()> {
        self.authorize(session)?;
        self.with_workspace(workspace_id, |ws| ws.add_container(title))
    }

    fn list_containers(&self, session: &Session, workspace_id: &str) -> Result<Vec<String>> {
        self.authorize(session)?;
        let workspaces = self.workspaces.read();
        let workspace = workspaces
            .get(workspace_id)
            .ok_or_else(|| LedgerError::WorkspaceNotFound(workspace_id.to_string()))?;
        Ok(workspace.titles())
    }

    fn find_folder(&self, session: &Session, name: &str) -> Result<String> {
        self.authorize(session)?;
        Ok(self.catalog.read().find_folder(name)?.id.clone())
    }

    fn list_spreadsheets_in_folder(
        &self,
        session: &Session,
        folder_id: &str,
    ) -> Result<Vec<WorkspaceRef>> {
        self.authorize(session)?;
        Ok(self.catalog.read().folder_by_id(folder_id)?.workspaces.clone())
    }
}
