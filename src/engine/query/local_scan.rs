use crate::engine::errors::QueryExecutionError;
use crate::engine::query::condition::{ConditionMap, TagCondition, exprs_to_condition};
use crate::engine::query::executor::{ExecutionContext, ItemIterator, SeekerBuilder, Shard};
use crate::engine::query::merge::{ItemComparator, ItemIter};
use crate::engine::query::order_by::OrderBy;
use crate::engine::query::projection::{ProjectionDisplay, project_item};
use crate::engine::schema::registry::StreamSchema;
use crate::engine::schema::types::{FieldRef, IndexRule, StreamMetadata};
use crate::engine::series::entity::Entity;
use crate::engine::series::path::Path;
use crate::engine::types::Element;
use crate::shared::time::TimeRange;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// The analyzed per-series scan: fans out across shards, builds one
/// seeker per matching series, and merges the resulting iterators into
/// the requested total order.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalIndexScan {
    time_range: TimeRange,
    schema: StreamSchema,
    metadata: StreamMetadata,
    condition_map: ConditionMap,
    projection_refs: Vec<Vec<FieldRef>>,
    entity: Entity,
    order_by: OrderBy,
}

impl LocalIndexScan {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        time_range: TimeRange,
        schema: StreamSchema,
        metadata: StreamMetadata,
        condition_map: ConditionMap,
        projection_refs: Vec<Vec<FieldRef>>,
        entity: Entity,
        order_by: OrderBy,
    ) -> Self {
        Self {
            time_range,
            schema,
            metadata,
            condition_map,
            projection_refs,
            entity,
            order_by,
        }
    }

    pub fn condition_map(&self) -> &ConditionMap {
        &self.condition_map
    }

    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    pub fn schema(&self) -> StreamSchema {
        self.schema.proj(&self.projection_refs)
    }

    pub async fn execute(
        &self,
        ec: &dyn ExecutionContext,
    ) -> Result<Vec<Element>, QueryExecutionError> {
        let shards = ec.shards(Some(&self.entity)).await?;
        debug!(
            target: "engine::query::local_scan",
            stream = %self.metadata,
            shard_count = shards.len(),
            "Fanning scan out across shards"
        );

        let mut iters = Vec::new();
        for shard in &shards {
            iters.extend(self.execute_in_shard(shard.as_ref())?);
        }

        let comparator = ItemComparator::from_order_by(&self.order_by);
        let mut elements = Vec::new();
        for item in ItemIter::new(iters, comparator) {
            let tag_families = project_item(item.as_ref(), &self.projection_refs)?;
            let element_id = ec
                .parse_element_id(item.as_ref())
                .map_err(|e| QueryExecutionError::Projection(e.to_string()))?;
            elements.push(Element {
                element_id,
                timestamp: item.time(),
                tag_families,
            });
        }

        info!(
            target: "engine::query::local_scan",
            stream = %self.metadata,
            count = elements.len(),
            "Local index scan completed"
        );
        Ok(elements)
    }

    fn execute_in_shard(
        &self,
        shard: &dyn Shard,
    ) -> Result<Vec<Box<dyn ItemIterator>>, QueryExecutionError> {
        let series_list = shard.series().list(&Path::new(&self.entity))?;

        // Configurators stack in order on a fresh builder per series:
        // ordering first, then one filter per condition-map entry.
        let mut configurators: Vec<Box<dyn Fn(&mut dyn SeekerBuilder) + '_>> = Vec::new();
        match &self.order_by.index {
            Some(rule) => {
                let rule = Arc::clone(rule);
                let sort = self.order_by.sort;
                configurators.push(Box::new(move |builder| {
                    builder.order_by_index(Arc::clone(&rule), sort);
                }));
            }
            None => {
                let sort = self.order_by.sort;
                configurators.push(Box::new(move |builder| {
                    builder.order_by_time(sort);
                }));
            }
        }
        if !self.condition_map.is_empty() {
            let filters: Vec<(Arc<IndexRule>, TagCondition)> = self
                .condition_map
                .iter()
                .map(|rc| (Arc::clone(&rc.rule), exprs_to_condition(&rc.exprs)))
                .collect();
            configurators.push(Box::new(move |builder| {
                for (rule, condition) in &filters {
                    builder.filter(Arc::clone(rule), condition.clone());
                }
            }));
        }

        let mut iters = Vec::new();
        for series in &series_list {
            let mut builder = shard.seeker_builder(series, self.time_range);
            for configure in &configurators {
                configure(builder.as_mut());
            }
            iters.extend(builder.build()?);
        }
        debug!(
            target: "engine::query::local_scan",
            shard_id = %shard.id(),
            series = series_list.len(),
            iterators = iters.len(),
            "Built seekers for shard"
        );
        Ok(iters)
    }
}

impl fmt::Display for LocalIndexScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions = if self.condition_map.is_empty() {
            "None".to_string()
        } else {
            self.condition_map.to_string()
        };
        write!(
            f,
            "LocalIndexScan: startTime={},endTime={},Metadata{{group={},name={}}},conditions={},orderBy={}; projection={}",
            self.time_range.start,
            self.time_range.end,
            self.metadata.group,
            self.metadata.name,
            conditions,
            self.order_by,
            ProjectionDisplay(&self.projection_refs),
        )
    }
}
