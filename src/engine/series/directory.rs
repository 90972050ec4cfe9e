use crate::engine::errors::StorageError;
use crate::engine::series::entity::Entity;
use crate::engine::series::path::Path;
use crate::engine::store::kv::KvStore;
use crate::engine::types::{SeriesId, ShardId};
use crate::shared::hash::stable_hash64;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A cheap reference to one series. Ordering is by series id first; this
/// is the total order callers use to make `list` results deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesHandle {
    pub shard_id: ShardId,
    pub series_id: SeriesId,
}

impl Ord for SeriesHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.series_id
            .cmp(&other.series_id)
            .then(self.shard_id.cmp(&other.shard_id))
    }
}

impl PartialOrd for SeriesHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Maps entities to series ids through the series-metadata KV. Reads go
/// straight to the store; new-series insertion is serialized by a
/// directory-wide mutex so concurrent gets for the same entity converge
/// to one id.
#[derive(Debug)]
pub struct SeriesDirectory {
    shard_id: ShardId,
    store: Arc<dyn KvStore>,
    insert_lock: Mutex<()>,
}

impl SeriesDirectory {
    pub fn new(shard_id: ShardId, store: Arc<dyn KvStore>) -> Self {
        Self {
            shard_id,
            store,
            insert_lock: Mutex::new(()),
        }
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// Resolves an entity to its series, creating it on first sight.
    pub fn get(&self, entity: &Entity) -> Result<SeriesHandle, StorageError> {
        self.get_by_hash_key(&entity.hash_key())
    }

    /// Same as `get` for an already-hashed entity key. Series ids are
    /// 64-bit hashes of the key; KV-level key uniqueness is the only
    /// collision handling, as two colliding entities also collide here.
    pub fn get_by_hash_key(&self, key: &[u8]) -> Result<SeriesHandle, StorageError> {
        match self.store.get(key) {
            Ok(id_bytes) => Ok(self.handle(decode_series_id(&id_bytes))),
            Err(err) if err.is_not_found() => {
                let _guard = self.insert_lock.lock().unwrap_or_else(|p| p.into_inner());
                // another writer may have won the race while we waited
                match self.store.get(key) {
                    Ok(id_bytes) => return Ok(self.handle(decode_series_id(&id_bytes))),
                    Err(err) if err.is_not_found() => {}
                    Err(err) => return Err(err.into()),
                }
                let series_id = SeriesId(stable_hash64(key));
                self.store.put(key, &series_id.0.to_be_bytes())?;
                debug!(
                    target: "span_db::series",
                    shard_id = %self.shard_id,
                    series_id = %series_id,
                    "Registered new series"
                );
                Ok(self.handle(series_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns a handle without touching the store; the id is trusted.
    pub fn get_by_id(&self, id: SeriesId) -> SeriesHandle {
        self.handle(id)
    }

    /// Lists the series matching a path. A full path is a single point
    /// get (absent key means no series, not an error); a partial path is
    /// a prefix scan with the mask/template admission test. Results come
    /// back in scan order.
    pub fn list(&self, path: &Path) -> Result<Vec<SeriesHandle>, StorageError> {
        if path.is_full() {
            return match self.store.get(path.prefix()) {
                Ok(id_bytes) => {
                    let handle = self.handle(decode_series_id(&id_bytes));
                    debug!(
                        target: "span_db::series",
                        shard_id = %self.shard_id,
                        series_id = %handle.series_id,
                        "Listed series by point get"
                    );
                    Ok(vec![handle])
                }
                Err(err) if err.is_not_found() => Ok(Vec::new()),
                Err(err) => Err(err.into()),
            };
        }

        let mut result = Vec::new();
        self.store
            .scan_prefix(path.prefix(), &mut |key, id_bytes| {
                if path.matches(key) {
                    result.push(decode_series_id(id_bytes));
                }
                Ok(())
            })?;
        debug!(
            target: "span_db::series",
            shard_id = %self.shard_id,
            matches = result.len(),
            "Listed series by prefix scan"
        );
        Ok(result.into_iter().map(|id| self.handle(id)).collect())
    }

    fn handle(&self, series_id: SeriesId) -> SeriesHandle {
        SeriesHandle {
            shard_id: self.shard_id,
            series_id,
        }
    }
}

fn decode_series_id(bytes: &[u8]) -> SeriesId {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    SeriesId(u64::from_be_bytes(buf))
}
