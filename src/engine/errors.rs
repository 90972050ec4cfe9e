use crate::engine::store::kv::KvError;
use thiserror::Error;

/// Errors raised while turning an unresolved scan into an executable plan.
/// Analysis failures abort plan construction with no side effects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("index not defined for tag: {0}")]
    IndexNotDefined(String),

    #[error("a query can touch at most one global index")]
    MultipleGlobalIndexes,

    #[error("schema resolution failed: {0}")]
    SchemaResolution(String),
}

/// Errors surfaced by the storage layer during a scan.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("series metadata error: {0}")]
    Kv(#[from] KvError),

    #[error("shard access failed: {0}")]
    Shard(String),

    #[error("seeker construction failed: {0}")]
    Seeker(String),

    #[error("global index lookup failed: {0}")]
    GlobalIndex(String),
}

/// Errors that can occur during plan execution. Execution errors abort the
/// request; partial element lists are never returned.
#[derive(Debug, Error)]
pub enum QueryExecutionError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("projection failed: {0}")]
    Projection(String),

    #[error("query cancelled")]
    Cancelled,
}
