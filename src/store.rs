//! Persistence and change-notification collaborators.
//!
//! The engine treats the bracket as one aggregate: it is loaded whole, replaced whole, and
//! announced whole. Retry and timeout policy belongs to the adapters, not the engine.

use crate::models::{BracketDocument, StoreError};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Load/save of the single bracket document.
pub trait BracketStore: Send + Sync {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<BracketDocument>, StoreError>;
    fn save(&self, document: &BracketDocument) -> Result<(), StoreError>;
}

/// Told about every successfully saved document.
pub trait ChangeNotifier: Send + Sync {
    fn notify_changed(&self, document: &BracketDocument);
}

/// In-memory store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<BracketDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BracketStore for MemoryStore {
    fn load(&self) -> Result<Option<BracketDocument>, StoreError> {
        let guard = self.document.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, document: &BracketDocument) -> Result<(), StoreError> {
        let mut guard = self.document.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(document.clone());
        Ok(())
    }
}

/// JSON file on disk. Writes go to a sibling temp file and are renamed into place.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BracketStore for JsonFileStore {
    fn load(&self) -> Result<Option<BracketDocument>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, document: &BracketDocument) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(document)?;
        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("Saved bracket to {}", self.path.display());
        Ok(())
    }
}

/// Fans saved documents out to subscribers (long-polling viewers).
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Arc<BracketDocument>>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BracketDocument>> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify_changed(&self, document: &BracketDocument) {
        // No subscribers is fine: nobody is polling right now.
        if let Ok(n) = self.sender.send(Arc::new(document.clone())) {
            debug!("Notified {} subscriber(s)", n);
        }
    }
}

/// Discards notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify_changed(&self, _document: &BracketDocument) {}
}
