use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("key not found")]
    KeyNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KvError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, KvError::KeyNotFound)
    }
}

/// Key-value seam backing the series directory. A durable store drops in
/// through this trait; the query core never sees anything below it.
pub trait KvStore: Send + Sync + Debug {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError>;

    /// Visits every entry whose key starts with `prefix`, in key order.
    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), KvError>,
    ) -> Result<(), KvError>;
}

/// In-memory store used as the default backing and in tests.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError> {
        self.entries
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
            .ok_or(KvError::KeyNotFound)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), KvError>,
    ) -> Result<(), KvError> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        for (key, value) in entries.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            visit(key, value)?;
        }
        Ok(())
    }
}
