//! Persistent gateway backed by a directory.
//!
//! Layout:
//!
//! ```text
//! <path>/LOCK              exclusive process lock
//! <path>/catalog.bin       folders and their workspace references
//! <path>/workspaces/*.wsp  one file per workspace, all containers inside
//! ```
//!
//! Both file kinds share one frame: magic, version, body length, MessagePack
//! body, CRC32 of the body. Files are replaced atomically via rename.

use super::grid::{Catalog, Folder, Workspace};
use super::{derive_id, StoreGateway};
use crate::error::{LedgerError, Result};
use crate::range::RangeSpec;
use crate::session::Session;
use crate::types::{CellGrid, Row, WorkspaceRef};
use fs2::FileExt;
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Magic bytes for the catalog file.
const CATALOG_MAGIC: &[u8; 4] = b"CAT\0";

/// Magic bytes for workspace files.
const WORKSPACE_MAGIC: &[u8; 4] = b"WSP\0";

/// Current on-disk format version.
const FORMAT_VERSION: u8 = 1;

/// Disk gateway configuration.
#[derive(Clone, Debug)]
pub struct DiskGatewayConfig {
    /// Base directory.
    pub path: PathBuf,

    /// Decoded workspaces kept in memory.
    pub cache_size: usize,

    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,
}

impl Default for DiskGatewayConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./liftlog-store"),
            cache_size: 64,
            create_if_missing: true,
        }
    }
}

/// Gateway persisting folders, workspaces and grids under one directory.
pub struct DiskGateway {
    config: DiskGatewayConfig,

    /// Lock file for exclusive access.
    _lock_file: File,

    /// Folder directory, mirrored on disk.
    catalog: RwLock<Catalog>,

    /// Recently used workspaces.
    cache: Mutex<LruCache<String, Workspace>>,

    /// Serializes read-modify-write of workspace files.
    write_lock: Mutex<()>,
}

impl DiskGateway {
    /// Open an existing store or create a new one.
    pub fn open_or_create(config: DiskGatewayConfig) -> Result<Self> {
        if config.path.join("catalog.bin").exists() {
            Self::open(config)
        } else if config.create_if_missing {
            Self::create(config)
        } else {
            Err(LedgerError::NotInitialized)
        }
    }

    /// Create a new, empty store.
    pub fn create(config: DiskGatewayConfig) -> Result<Self> {
        fs::create_dir_all(config.path.join("workspaces"))?;
        let lock_file = Self::acquire_lock(&config.path)?;

        let catalog = Catalog::default();
        write_framed(&config.path.join("catalog.bin"), CATALOG_MAGIC, &catalog)?;
        tracing::info!(path = %config.path.display(), "created disk store");

        Ok(Self::assemble(config, lock_file, catalog))
    }

    /// Open an existing store.
    pub fn open(config: DiskGatewayConfig) -> Result<Self> {
        let lock_file = Self::acquire_lock(&config.path)?;
        let catalog: Catalog = read_framed(&config.path.join("catalog.bin"), CATALOG_MAGIC)?;
        tracing::debug!(
            path = %config.path.display(),
            folders = catalog.folders.len(),
            "opened disk store"
        );

        Ok(Self::assemble(config, lock_file, catalog))
    }

    fn assemble(config: DiskGatewayConfig, lock_file: File, catalog: Catalog) -> Self {
        let cache_size = NonZeroUsize::new(config.cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            _lock_file: lock_file,
            catalog: RwLock::new(catalog),
            cache: Mutex::new(LruCache::new(cache_size)),
            write_lock: Mutex::new(()),
        }
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_file = File::create(path.join("LOCK"))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| LedgerError::Locked)?;
        Ok(lock_file)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Create a folder (duplicate names are allowed, as in the real store).
    pub fn create_folder(&self, name: &str) -> Result<String> {
        let _lock = self.write_lock.lock();
        let mut catalog = self.catalog.write();

        let nonce = catalog.take_nonce();
        let id = derive_id("folder", "", name, nonce);
        catalog.folders.push(Folder {
            id: id.clone(),
            name: name.to_string(),
            workspaces: Vec::new(),
        });
        self.persist_catalog(&catalog)?;
        Ok(id)
    }

    /// Create an empty workspace inside a folder.
    pub fn create_workspace(&self, folder_id: &str, name: &str) -> Result<WorkspaceRef> {
        let _lock = self.write_lock.lock();
        let mut catalog = self.catalog.write();

        let nonce = catalog.take_nonce();
        let workspace = Workspace::new(derive_id("ws", folder_id, name, nonce), name);
        let reference = workspace.reference();
        catalog
            .folder_by_id_mut(folder_id)?
            .workspaces
            .push(reference.clone());

        self.store_workspace(&workspace)?;
        self.persist_catalog(&catalog)?;
        Ok(reference)
    }

    /// Copy of the full grid of a container, for inspection.
    pub fn snapshot(&self, workspace_id: &str, title: &str) -> Result<CellGrid> {
        let workspace = self.load_workspace(workspace_id)?;
        Ok(workspace.container(title)?.rows.clone())
    }

    fn persist_catalog(&self, catalog: &Catalog) -> Result<()> {
        write_framed(&self.config.path.join("catalog.bin"), CATALOG_MAGIC, catalog)
    }

    /// File of a workspace. Ids are restricted to `[A-Za-z0-9_-]` so they
    /// cannot leave the `workspaces` directory.
    fn workspace_path(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LedgerError::WorkspaceNotFound(id.to_string()));
        }
        Ok(self
            .config
            .path
            .join("workspaces")
            .join(format!("{}.wsp", id)))
    }

    fn load_workspace(&self, id: &str) -> Result<Workspace> {
        if let Some(cached) = self.cache.lock().get(id).cloned() {
            return Ok(cached);
        }

        let path = self.workspace_path(id)?;
        if !path.exists() {
            return Err(LedgerError::WorkspaceNotFound(id.to_string()));
        }
        let workspace: Workspace = read_framed(&path, WORKSPACE_MAGIC)?;
        self.cache.lock().put(id.to_string(), workspace.clone());
        Ok(workspace)
    }

    fn store_workspace(&self, workspace: &Workspace) -> Result<()> {
        write_framed(&self.workspace_path(&workspace.id)?, WORKSPACE_MAGIC, workspace)?;
        self.cache.lock().put(workspace.id.clone(), workspace.clone());
        Ok(())
    }

    /// Load, mutate and persist a workspace under the write lock.
    fn mutate_workspace<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Workspace) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.write_lock.lock();
        let mut workspace = self.load_workspace(id)?;
        let out = f(&mut workspace)?;
        self.store_workspace(&workspace)?;
        Ok(out)
    }
}

impl StoreGateway for DiskGateway {
    fn read_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
    ) -> Result<CellGrid> {
        session.ready()?;
        let workspace = self.load_workspace(workspace_id)?;
        Ok(workspace.container(&range.container)?.read(range))
    }

    fn write_range(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        session.ready()?;
        self.mutate_workspace(workspace_id, |ws| {
            ws.container_mut(&range.container)?.write(range, rows)
        })
    }

    fn append_rows(
        &self,
        session: &Session,
        workspace_id: &str,
        range: &RangeSpec,
        rows: &[Row],
    ) -> Result<()> {
        session.ready()?;
        self.mutate_workspace(workspace_id, |ws| {
            ws.container_mut(&range.container)?.append(range, rows)
        })?;
        Ok(())
    }

    fn create_container(&self, session: &Session, workspace_id: &str, title: &str) -> Result<()> {
        session.ready()?;
        self.mutate_workspace(workspace_id, |ws| ws.add_container(title))
    }

    fn list_containers(&self, session: &Session, workspace_id: &str) -> Result<Vec<String>> {
        session.ready()?;
        Ok(self.load_workspace(workspace_id)?.titles())
    }

    fn find_folder(&self, session: &Session, name: &str) -> Result<String> {
        session.ready()?;
        Ok(self.catalog.read().find_folder(name)?.id.clone())
    }

    fn list_spreadsheets_in_folder(
        &self,
        session: &Session,
        folder_id: &str,
    ) -> Result<Vec<WorkspaceRef>> {
        session.ready()?;
        Ok(self.catalog.read().folder_by_id(folder_id)?.workspaces.clone())
    }
}

/// Write `value` framed and checksummed, replacing `path` atomically.
fn write_framed<T: Serialize>(path: &Path, magic: &[u8; 4], value: &T) -> Result<()> {
    let body = rmp_serde::to_vec(value)?;
    let tmp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&tmp_path)?;

        // Header
        file.write_all(magic)?;
        file.write_all(&[FORMAT_VERSION])?;

        // Body
        file.write_all(&(body.len() as u64).to_le_bytes())?;
        file.write_all(&body)?;

        // Checksum
        file.write_all(&crc32fast::hash(&body).to_le_bytes())?;

        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and verify a framed file.
fn read_framed<T: DeserializeOwned>(path: &Path, magic: &[u8; 4]) -> Result<T> {
    let mut file = File::open(path)?;

    let mut found_magic = [0u8; 4];
    file.read_exact(&mut found_magic)?;
    if &found_magic != magic {
        return Err(LedgerError::InvalidFormat(format!(
            "Invalid magic in {}",
            path.display()
        )));
    }

    let mut version = [0u8; 1];
    file.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(LedgerError::InvalidFormat(format!(
            "Unsupported format version: {}",
            version[0]
        )));
    }

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)?;
    let len = u64::from_le_bytes(len_bytes) as usize;

    let mut body = vec![0u8; len];
    file.read_exact(&mut body)?;

    let mut checksum_bytes = [0u8; 4];
    file.read_exact(&mut checksum_bytes)?;
    let stored = u32::from_le_bytes(checksum_bytes);
    let computed = crc32fast::hash(&body);
    if stored != computed {
        return Err(LedgerError::ChecksumMismatch {
            expected: stored,
            got: computed,
        });
    }

    Ok(rmp_serde::from_slice(&body)?)
}
