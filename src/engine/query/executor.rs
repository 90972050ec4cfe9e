use crate::engine::errors::StorageError;
use crate::engine::query::condition::TagCondition;
use crate::engine::schema::types::IndexRule;
use crate::engine::series::directory::{SeriesDirectory, SeriesHandle};
use crate::engine::series::entity::Entity;
use crate::engine::types::{SeriesId, ShardId, Sort, TagValue};
use crate::shared::time::TimeRange;
use async_trait::async_trait;
use std::sync::Arc;

/// One stored element as the scan sees it. Items borrow storage
/// resources through their source iterator; both are released on drop.
pub trait Item: Send {
    /// Nanoseconds since the epoch.
    fn time(&self) -> i64;

    fn series_id(&self) -> SeriesId;

    /// Identity within the series; the final merge tie-break.
    fn item_id(&self) -> u64;

    /// The index sort key, present when the seeker was ordered by index.
    fn sort_key(&self) -> Option<&[u8]>;

    fn tag_value(&self, family: &str, tag: &str) -> Option<TagValue>;
}

pub type BoxedItem = Box<dyn Item>;

/// A pull cursor over one seekable series segment. Emission follows the
/// seeker configuration (by index or by time, ASC or DESC) and stays
/// inside the time range the seeker was built over.
pub trait ItemIterator: Send {
    fn next(&mut self) -> Option<BoxedItem>;
}

/// Builds a seeker for one series over one time range. Configurators are
/// applied in order before `build`; implementors must honor the submitted
/// `[start, end)` window, so iterators never yield items outside it.
pub trait SeekerBuilder: Send {
    fn order_by_index(&mut self, rule: Arc<IndexRule>, sort: Sort);

    fn order_by_time(&mut self, sort: Sort);

    fn filter(&mut self, rule: Arc<IndexRule>, condition: TagCondition);

    fn build(self: Box<Self>) -> Result<Vec<Box<dyn ItemIterator>>, StorageError>;
}

/// A horizontal partition of series.
#[async_trait]
pub trait Shard: Send + Sync {
    fn id(&self) -> ShardId;

    fn series(&self) -> &SeriesDirectory;

    fn seeker_builder<'a>(
        &'a self,
        series: &SeriesHandle,
        time_range: TimeRange,
    ) -> Box<dyn SeekerBuilder + 'a>;

    /// Cross-series inverted lookup against a GLOBAL index rule. Not
    /// narrowed by time; global indices are time-agnostic.
    async fn lookup_global(
        &self,
        rule: &IndexRule,
        condition: &TagCondition,
    ) -> Result<Vec<BoxedItem>, StorageError>;
}

/// What plan execution consumes from the storage layer. Cancellation and
/// timeouts propagate from the implementor's ambient context; a cancelled
/// call surfaces as an error and the scan aborts.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// The shards an entity may live on; `None` enumerates all shards.
    async fn shards(&self, entity: Option<&Entity>) -> Result<Vec<Arc<dyn Shard>>, StorageError>;

    fn parse_element_id(&self, item: &dyn Item) -> Result<Vec<u8>, StorageError>;
}
