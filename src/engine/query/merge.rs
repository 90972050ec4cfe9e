use crate::engine::query::executor::{BoxedItem, Item, ItemIterator};
use crate::engine::query::order_by::OrderBy;
use crate::engine::types::Sort;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Total order over items: by index sort key or by time under the
/// requested direction, then always lower series-id first and lower
/// item-id first. The tie-break makes re-runs of the same plan emit
/// byte-identical sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemComparator {
    sort: Sort,
    by_index: bool,
}

impl ItemComparator {
    pub fn new(sort: Sort, by_index: bool) -> Self {
        Self { sort, by_index }
    }

    pub fn from_order_by(order_by: &OrderBy) -> Self {
        Self {
            sort: order_by.sort,
            by_index: order_by.index.is_some(),
        }
    }

    pub fn compare(&self, a: &dyn Item, b: &dyn Item) -> Ordering {
        let primary = if self.by_index {
            a.sort_key().cmp(&b.sort_key())
        } else {
            a.time().cmp(&b.time())
        };
        let primary = match self.sort {
            Sort::Asc => primary,
            Sort::Desc => primary.reverse(),
        };
        primary
            .then_with(|| a.series_id().cmp(&b.series_id()))
            .then_with(|| a.item_id().cmp(&b.item_id()))
    }
}

struct HeapEntry {
    item: BoxedItem,
    source: usize,
    comparator: Arc<ItemComparator>,
}

impl Eq for HeapEntry {}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-under-comparator
        self.comparator
            .compare(self.item.as_ref(), other.item.as_ref())
            .reverse()
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// K-way merge of locally ordered iterators into one globally ordered
/// stream. Each `next` pops the least head and refills from its source:
/// `O(log n)` per item, `O(n)` heads held. Dropping the merge drops the
/// source iterators and whatever storage they borrow.
pub struct ItemIter {
    sources: Vec<Box<dyn ItemIterator>>,
    heap: BinaryHeap<HeapEntry>,
    comparator: Arc<ItemComparator>,
}

impl ItemIter {
    pub fn new(mut sources: Vec<Box<dyn ItemIterator>>, comparator: ItemComparator) -> Self {
        let comparator = Arc::new(comparator);
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (source, iter) in sources.iter_mut().enumerate() {
            if let Some(item) = iter.next() {
                heap.push(HeapEntry {
                    item,
                    source,
                    comparator: Arc::clone(&comparator),
                });
            }
        }
        Self {
            sources,
            heap,
            comparator,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.heap.is_empty()
    }
}

impl Iterator for ItemIter {
    type Item = BoxedItem;

    fn next(&mut self) -> Option<BoxedItem> {
        let top = self.heap.pop()?;
        if let Some(replacement) = self.sources[top.source].next() {
            self.heap.push(HeapEntry {
                item: replacement,
                source: top.source,
                comparator: Arc::clone(&self.comparator),
            });
        }
        Some(top.item)
    }
}
