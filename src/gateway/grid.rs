//! In-memory cell grid model shared by the gateway implementations.

use crate::error::{LedgerError, Result};
use crate::range::RangeSpec;
use crate::types::{CellGrid, Row, WorkspaceRef};
use serde::{Deserialize, Serialize};

/// One named tab of a workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub title: String,
    pub rows: CellGrid,
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.is_empty())
}

impl Container {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Values inside `range`, trimmed of trailing blank rows.
    ///
    /// Cells inside a row come back exactly as written, empty ones included,
    /// so a five-cell row with an empty weight still reads as five cells.
    pub fn read(&self, range: &RangeSpec) -> CellGrid {
        let start = range.first_row_index();
        let end = range
            .end_row_index()
            .unwrap_or(self.rows.len())
            .min(self.rows.len());
        if start >= end {
            return Vec::new();
        }

        let cols = range.column_span();
        let mut out: CellGrid = self.rows[start..end]
            .iter()
            .map(|row| {
                let lo = cols.start.min(row.len());
                let hi = cols.end.min(row.len());
                row[lo..hi].to_vec()
            })
            .collect();

        while out.last().is_some_and(|r| is_blank(r)) {
            out.pop();
        }
        out
    }

    /// Overwrite the rectangle starting at the range's top-left cell.
    pub fn write(&mut self, range: &RangeSpec, rows: &[Row]) -> Result<()> {
        if range.start_row == Some(0) {
            return Err(LedgerError::InvalidRange(format!("{} starts at row 0", range)));
        }
        let start = range.first_row_index();
        if let Some(end) = range.end_row_index() {
            if start + rows.len() > end {
                return Err(LedgerError::InvalidRange(format!(
                    "{} rows do not fit in {}",
                    rows.len(),
                    range
                )));
            }
        }
        if let Some(wide) = rows.iter().find(|r| r.len() > range.width()) {
            return Err(LedgerError::InvalidRange(format!(
                "{} cells do not fit in {}",
                wide.len(),
                range
            )));
        }

        for (offset, cells) in rows.iter().enumerate() {
            let idx = start + offset;
            if self.rows.len() <= idx {
                self.rows.resize_with(idx + 1, Vec::new);
            }
            let row = &mut self.rows[idx];
            let needed = range.start_col + cells.len();
            if row.len() < needed {
                row.resize(needed, String::new());
            }
            for (col, cell) in cells.iter().enumerate() {
                row[range.start_col + col] = cell.clone();
            }
        }
        Ok(())
    }

    /// Write `rows` after the last row with a populated cell inside the range's columns.
    ///
    /// Returns the 0-based index of the first appended row.
    pub fn append(&mut self, range: &RangeSpec, rows: &[Row]) -> Result<usize> {
        let cols = range.column_span();
        let last_populated = self.rows.iter().rposition(|row| {
            let lo = cols.start.min(row.len());
            let hi = cols.end.min(row.len());
            !is_blank(&row[lo..hi])
        });
        let at = last_populated
            .map(|i| i + 1)
            .unwrap_or(0)
            .max(range.first_row_index());

        let target = RangeSpec {
            container: range.container.clone(),
            start_col: range.start_col,
            end_col: range.end_col,
            start_row: Some(at as u32 + 1),
            end_row: None,
        };
        self.write(&target, rows)?;
        Ok(at)
    }
}

/// A workspace: an ordered list of containers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub containers: Vec<Container>,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            containers: Vec::new(),
        }
    }

    pub fn reference(&self) -> WorkspaceRef {
        WorkspaceRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.containers.iter().map(|c| c.title.clone()).collect()
    }

    pub fn container(&self, title: &str) -> Result<&Container> {
        self.containers
            .iter()
            .find(|c| c.title == title)
            .ok_or_else(|| LedgerError::ContainerNotFound(title.to_string()))
    }

    pub fn container_mut(&mut self, title: &str) -> Result<&mut Container> {
        self.containers
            .iter_mut()
            .find(|c| c.title == title)
            .ok_or_else(|| LedgerError::ContainerNotFound(title.to_string()))
    }

    /// Add an empty container at the end.
    pub fn add_container(&mut self, title: &str) -> Result<()> {
        if self.containers.iter().any(|c| c.title == title) {
            return Err(LedgerError::ContainerExists(title.to_string()));
        }
        self.containers.push(Container::new(title));
        Ok(())
    }
}

/// A folder holding workspace references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub workspaces: Vec<WorkspaceRef>,
}

/// Folder directory of a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub folders: Vec<Folder>,
    /// Monotonic counter feeding id generation.
    pub next_nonce: u64,
}

impl Catalog {
    /// First folder with exactly this name.
    pub fn find_folder(&self, name: &str) -> Result<&Folder> {
        self.folders
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LedgerError::FolderNotFound(name.to_string()))
    }

    pub fn folder_by_id(&self, id: &str) -> Result<&Folder> {
        self.folders
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| LedgerError::FolderNotFound(id.to_string()))
    }

    pub fn folder_by_id_mut(&mut self, id: &str) -> Result<&mut Folder> {
        self.folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| LedgerError::FolderNotFound(id.to_string()))
    }

    pub fn take_nonce(&mut self) -> u64 {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }
}
