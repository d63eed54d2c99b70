//! Snapshot persistence.
//!
//! Only the vectors and ids are stored; names are re-attached from the
//! catalog when a snapshot is loaded. The file layout is a small header
//! followed by two positionally aligned flat arrays:
//!
//! ```text
//! magic "SKVX" | version u32 | dims u32 | rows u32 | rows*dims f32 | rows i32
//! ```
//!
//! All values are little-endian. Saves go through a temporary file in the same
//! directory that is fsynced and then renamed over the target, so readers see
//! either the previous file or the new one.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::catalog::SkillId;
use crate::error::{Result, SuggestError};
use crate::search::snapshot::EmbeddingSnapshot;

const MAGIC: &[u8; 4] = b"SKVX";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Vectors and ids as read back from storage, before names are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVectors {
    pub dims: usize,
    pub vectors: Vec<f32>,
    pub ids: Vec<SkillId>,
}

impl StoredVectors {
    #[must_use]
    pub fn from_snapshot(snapshot: &EmbeddingSnapshot) -> Self {
        Self {
            dims: snapshot.dims(),
            vectors: snapshot.vectors().to_vec(),
            ids: snapshot.ids().to_vec(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub trait SnapshotPersistence: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet; `Err` when stored data is
    /// unreadable or malformed.
    fn load(&self) -> Result<Option<StoredVectors>>;

    fn save(&self, snapshot: &EmbeddingSnapshot) -> Result<()>;
}

/// Binary snapshot file on local disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotPersistence for FileSnapshotStore {
    fn load(&self) -> Result<Option<StoredVectors>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no persisted snapshot");
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(|err| {
            SuggestError::Persistence(format!("read {}: {err}", self.path.display()))
        })?;
        let stored = decode(&bytes).map_err(|err| {
            SuggestError::Persistence(format!("{}: {err}", self.path.display()))
        })?;
        info!(path = %self.path.display(), rows = stored.len(), "loaded persisted snapshot");
        Ok(Some(stored))
    }

    fn save(&self, snapshot: &EmbeddingSnapshot) -> Result<()> {
        let persist_err =
            |err: std::io::Error| SuggestError::Persistence(format!("write {}: {err}", self.path.display()));

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(persist_err)?;

        let bytes = encode(snapshot)?;
        let mut temp = NamedTempFile::new_in(&parent).map_err(persist_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            writer.write_all(&bytes).map_err(persist_err)?;
            writer.flush().map_err(persist_err)?;
        }
        temp.as_file().sync_all().map_err(persist_err)?;
        temp.persist(&self.path).map_err(|err| persist_err(err.error))?;

        info!(path = %self.path.display(), rows = snapshot.len(), "saved snapshot");
        Ok(())
    }
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    stored: Mutex<Option<StoredVectors>>,
    saves: Mutex<usize>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store as if a previous run had saved `stored`.
    #[must_use]
    pub fn with_stored(stored: StoredVectors) -> Self {
        Self {
            stored: Mutex::new(Some(stored)),
            saves: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    #[must_use]
    pub fn stored(&self) -> Option<StoredVectors> {
        self.stored.lock().clone()
    }
}

impl SnapshotPersistence for MemorySnapshotStore {
    fn load(&self) -> Result<Option<StoredVectors>> {
        Ok(self.stored.lock().clone())
    }

    fn save(&self, snapshot: &EmbeddingSnapshot) -> Result<()> {
        *self.stored.lock() = Some(StoredVectors::from_snapshot(snapshot));
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Serialize a snapshot's vectors and ids into the on-disk layout.
pub fn encode(snapshot: &EmbeddingSnapshot) -> Result<Vec<u8>> {
    let too_large = |what: &str| SuggestError::Persistence(format!("{what} does not fit in u32"));
    let dims = u32::try_from(snapshot.dims()).map_err(|_| too_large("dimension"))?;
    let rows = u32::try_from(snapshot.len()).map_err(|_| too_large("row count"))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + 4 * (snapshot.vectors().len() + snapshot.len()));
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&dims.to_le_bytes());
    bytes.extend_from_slice(&rows.to_le_bytes());
    for value in snapshot.vectors() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    for id in snapshot.ids() {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    Ok(bytes)
}

/// Parse the on-disk layout; rejects truncated or trailing data.
pub fn decode(bytes: &[u8]) -> std::result::Result<StoredVectors, String> {
    if bytes.len() < HEADER_LEN {
        return Err(format!("file too short ({} bytes)", bytes.len()));
    }
    if &bytes[0..4] != MAGIC {
        return Err("bad magic".to_string());
    }
    let version = read_u32(bytes, 4);
    if version != FORMAT_VERSION {
        return Err(format!("unsupported format version {version}"));
    }
    let dims = read_u32(bytes, 8) as usize;
    let rows = read_u32(bytes, 12) as usize;
    if dims == 0 {
        return Err("dimension is zero".to_string());
    }

    let float_count = rows
        .checked_mul(dims)
        .ok_or_else(|| "row count overflows".to_string())?;
    let expected = float_count
        .checked_add(rows)
        .and_then(|words| words.checked_mul(4))
        .and_then(|payload| payload.checked_add(HEADER_LEN))
        .ok_or_else(|| "payload size overflows".to_string())?;
    if bytes.len() != expected {
        return Err(format!(
            "expected {expected} bytes for {rows} rows of dimension {dims}, found {}",
            bytes.len()
        ));
    }

    let payload = &bytes[HEADER_LEN..];
    let (vector_bytes, id_bytes) = payload.split_at(float_count * 4);
    let vectors = vector_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    let ids = id_bytes
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(StoredVectors { dims, vectors, ids })
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
