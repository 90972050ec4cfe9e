use crate::engine::errors::StorageError;
use crate::engine::query::condition::{ConditionValue, TagCondition};
use crate::engine::query::executor::{
    BoxedItem, ExecutionContext, Item, ItemIterator, SeekerBuilder, Shard,
};
use crate::engine::query::expr::CompareOp;
use crate::engine::schema::types::IndexRule;
use crate::engine::series::directory::{SeriesDirectory, SeriesHandle};
use crate::engine::series::entity::Entity;
use crate::engine::store::kv::MemoryKvStore;
use crate::engine::types::{SeriesId, ShardId, Sort, TagValue};
use crate::shared::time::TimeRange;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory item fixture. Element ids are derived by the mock execution
/// context as `<series_id>/<item_id>`.
#[derive(Debug, Clone)]
pub struct MockItem {
    time: i64,
    series_id: SeriesId,
    item_id: Option<u64>,
    sort_key: Option<Vec<u8>>,
    tags: HashMap<(String, String), TagValue>,
}

impl MockItem {
    pub fn at(time: i64) -> Self {
        Self {
            time,
            series_id: SeriesId(0),
            item_id: None,
            sort_key: None,
            tags: HashMap::new(),
        }
    }

    pub fn with_item_id(mut self, item_id: u64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn with_series_id(mut self, series_id: SeriesId) -> Self {
        self.series_id = series_id;
        self
    }

    pub fn with_sort_key(mut self, key: &[u8]) -> Self {
        self.sort_key = Some(key.to_vec());
        self
    }

    pub fn with_tag(mut self, family: &str, tag: &str, value: impl Into<TagValue>) -> Self {
        self.tags
            .insert((family.to_string(), tag.to_string()), value.into());
        self
    }

    fn tag_by_name(&self, tag: &str) -> Option<&TagValue> {
        self.tags
            .iter()
            .find(|((_, name), _)| name == tag)
            .map(|(_, value)| value)
    }
}

impl Item for MockItem {
    fn time(&self) -> i64 {
        self.time
    }

    fn series_id(&self) -> SeriesId {
        self.series_id
    }

    fn item_id(&self) -> u64 {
        self.item_id.unwrap_or(0)
    }

    fn sort_key(&self) -> Option<&[u8]> {
        self.sort_key.as_deref()
    }

    fn tag_value(&self, family: &str, tag: &str) -> Option<TagValue> {
        self.tags
            .get(&(family.to_string(), tag.to_string()))
            .cloned()
    }
}

/// One recorded configurator invocation, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekerCall {
    OrderByIndex { rule: String, sort: Sort },
    OrderByTime { sort: Sort },
    Filter { rule: String, tags: Vec<String> },
}

fn matches_condition(item: &MockItem, condition: &TagCondition) -> bool {
    condition.iter().all(|(tag, predicates)| {
        let Some(value) = item.tag_by_name(tag) else {
            return false;
        };
        let encoded = value.bytes();
        let Some(encoded) = encoded.first() else {
            return false;
        };
        predicates.iter().all(|p| matches_predicate(encoded, p))
    })
}

fn matches_predicate(encoded: &[u8], predicate: &ConditionValue) -> bool {
    let first = predicate.values.first();
    match predicate.op {
        CompareOp::Eq => first.is_some_and(|v| v.as_slice() == encoded),
        CompareOp::Ne => first.is_some_and(|v| v.as_slice() != encoded),
        CompareOp::Lt => first.is_some_and(|v| encoded < v.as_slice()),
        CompareOp::Le => first.is_some_and(|v| encoded <= v.as_slice()),
        CompareOp::Gt => first.is_some_and(|v| encoded > v.as_slice()),
        CompareOp::Ge => first.is_some_and(|v| encoded >= v.as_slice()),
        CompareOp::In => predicate.values.iter().any(|v| v.as_slice() == encoded),
    }
}

enum SeekerOrder {
    ByTime(Sort),
    ByIndex(Sort),
}

struct MockSeekerBuilder<'a> {
    shard: &'a MockShard,
    series_id: SeriesId,
    time_range: TimeRange,
    order: Option<SeekerOrder>,
    filters: Vec<TagCondition>,
}

impl SeekerBuilder for MockSeekerBuilder<'_> {
    fn order_by_index(&mut self, rule: Arc<IndexRule>, sort: Sort) {
        self.shard.record(SeekerCall::OrderByIndex {
            rule: rule.name.clone(),
            sort,
        });
        self.order = Some(SeekerOrder::ByIndex(sort));
    }

    fn order_by_time(&mut self, sort: Sort) {
        self.shard.record(SeekerCall::OrderByTime { sort });
        self.order = Some(SeekerOrder::ByTime(sort));
    }

    fn filter(&mut self, rule: Arc<IndexRule>, condition: TagCondition) {
        let mut tags: Vec<String> = condition.keys().cloned().collect();
        tags.sort();
        self.shard.record(SeekerCall::Filter {
            rule: rule.name.clone(),
            tags,
        });
        self.filters.push(condition);
    }

    fn build(self: Box<Self>) -> Result<Vec<Box<dyn ItemIterator>>, StorageError> {
        if self.shard.take_seeker_failure() {
            return Err(StorageError::Seeker("injected seeker failure".to_string()));
        }
        let mut items: Vec<MockItem> = self
            .shard
            .items_for(self.series_id)
            .into_iter()
            .filter(|item| self.time_range.contains(item.time))
            .filter(|item| self.filters.iter().all(|f| matches_condition(item, f)))
            .collect();
        match self.order {
            Some(SeekerOrder::ByIndex(Sort::Asc)) => {
                items.sort_by(|a, b| a.sort_key.cmp(&b.sort_key))
            }
            Some(SeekerOrder::ByIndex(Sort::Desc)) => {
                items.sort_by(|a, b| b.sort_key.cmp(&a.sort_key))
            }
            Some(SeekerOrder::ByTime(Sort::Desc)) => items.sort_by(|a, b| b.time.cmp(&a.time)),
            Some(SeekerOrder::ByTime(Sort::Asc)) | None => {
                items.sort_by(|a, b| a.time.cmp(&b.time))
            }
        }
        Ok(vec![Box::new(VecIter {
            items: items.into_iter(),
        })])
    }
}

struct VecIter {
    items: std::vec::IntoIter<MockItem>,
}

impl ItemIterator for VecIter {
    fn next(&mut self) -> Option<BoxedItem> {
        self.items.next().map(|item| Box::new(item) as BoxedItem)
    }
}

pub struct MockShard {
    id: ShardId,
    directory: SeriesDirectory,
    items: Mutex<HashMap<SeriesId, Vec<MockItem>>>,
    global_items: Mutex<Vec<MockItem>>,
    calls: Mutex<Vec<SeekerCall>>,
    next_item_id: Mutex<u64>,
    fail_seeker: Mutex<bool>,
}

impl MockShard {
    pub fn new(id: ShardId) -> Self {
        Self {
            id,
            directory: SeriesDirectory::new(id, Arc::new(MemoryKvStore::new())),
            items: Mutex::new(HashMap::new()),
            global_items: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_item_id: Mutex::new(0),
            fail_seeker: Mutex::new(false),
        }
    }

    pub fn register_series(&self, entity: &Entity) -> SeriesHandle {
        self.directory.get(entity).expect("mock directory get")
    }

    /// Attaches an item to a series; item ids auto-increment per shard
    /// unless the fixture pinned one.
    pub fn add_item(&self, series: &SeriesHandle, item: MockItem) {
        let mut item = item.with_series_id(series.series_id);
        if item.item_id.is_none() {
            let mut next = self.next_item_id.lock().unwrap();
            item.item_id = Some(*next);
            *next += 1;
        }
        self.items
            .lock()
            .unwrap()
            .entry(series.series_id)
            .or_default()
            .push(item);
    }

    pub fn add_global_item(&self, item: MockItem) {
        let mut item = item;
        if item.item_id.is_none() {
            let mut next = self.next_item_id.lock().unwrap();
            item.item_id = Some(*next);
            *next += 1;
        }
        self.global_items.lock().unwrap().push(item);
    }

    pub fn calls(&self) -> Vec<SeekerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next_seeker_build(&self) {
        *self.fail_seeker.lock().unwrap() = true;
    }

    fn record(&self, call: SeekerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn items_for(&self, series_id: SeriesId) -> Vec<MockItem> {
        self.items
            .lock()
            .unwrap()
            .get(&series_id)
            .cloned()
            .unwrap_or_default()
    }

    fn take_seeker_failure(&self) -> bool {
        std::mem::take(&mut *self.fail_seeker.lock().unwrap())
    }
}

#[async_trait]
impl Shard for MockShard {
    fn id(&self) -> ShardId {
        self.id
    }

    fn series(&self) -> &SeriesDirectory {
        &self.directory
    }

    fn seeker_builder<'a>(
        &'a self,
        series: &SeriesHandle,
        time_range: TimeRange,
    ) -> Box<dyn SeekerBuilder + 'a> {
        Box::new(MockSeekerBuilder {
            shard: self,
            series_id: series.series_id,
            time_range,
            order: None,
            filters: Vec::new(),
        })
    }

    async fn lookup_global(
        &self,
        _rule: &IndexRule,
        condition: &TagCondition,
    ) -> Result<Vec<BoxedItem>, StorageError> {
        let items = self.global_items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|item| matches_condition(item, condition))
            .cloned()
            .map(|item| Box::new(item) as BoxedItem)
            .collect())
    }
}

pub struct MockExecutionContext {
    shards: Vec<Arc<MockShard>>,
}

impl MockExecutionContext {
    pub fn with_shards(shard_count: u32) -> Self {
        Self {
            shards: (0..shard_count)
                .map(|i| Arc::new(MockShard::new(ShardId(i))))
                .collect(),
        }
    }

    pub fn shard(&self, idx: usize) -> &Arc<MockShard> {
        &self.shards[idx]
    }
}

#[async_trait]
impl ExecutionContext for MockExecutionContext {
    async fn shards(&self, _entity: Option<&Entity>) -> Result<Vec<Arc<dyn Shard>>, StorageError> {
        Ok(self
            .shards
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn Shard>)
            .collect())
    }

    fn parse_element_id(&self, item: &dyn Item) -> Result<Vec<u8>, StorageError> {
        Ok(format!("{}/{}", item.series_id(), item.item_id()).into_bytes())
    }
}
