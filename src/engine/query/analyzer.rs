use crate::engine::errors::AnalyzeError;
use crate::engine::query::condition::ConditionMap;
use crate::engine::query::expr::Expr;
use crate::engine::query::global_scan::GlobalIndexScan;
use crate::engine::query::local_scan::LocalIndexScan;
use crate::engine::query::order_by::UnresolvedOrderBy;
use crate::engine::query::plan::Plan;
use crate::engine::schema::registry::{StreamSchema, TagProjection};
use crate::engine::schema::types::{IndexLocation, IndexRule, StreamMetadata};
use crate::engine::series::entity::Entity;
use crate::engine::types::Sort;
use crate::shared::time::TimeRange;
use std::sync::Arc;
use tracing::debug;

/// A scan request before schema resolution: raw expressions, a stream
/// handle, and unbound ordering/projection. `analyze` turns it into an
/// executable plan or fails with no side effects.
#[derive(Debug, Clone)]
pub struct UnresolvedScan {
    time_range: TimeRange,
    metadata: StreamMetadata,
    conditions: Vec<Expr>,
    projection: Vec<TagProjection>,
    entity: Entity,
    order_by: Option<UnresolvedOrderBy>,
}

/// Composes an entity-driven scan over `[start_time, end_time)`.
pub fn index_scan(
    start_time: i64,
    end_time: i64,
    metadata: StreamMetadata,
    conditions: Vec<Expr>,
    entity: Entity,
    order_by: Option<UnresolvedOrderBy>,
    projection: Vec<TagProjection>,
) -> UnresolvedScan {
    UnresolvedScan {
        time_range: TimeRange::new(start_time, end_time),
        metadata,
        conditions,
        projection,
        entity,
        order_by,
    }
}

/// Composes a scan expected to route through a global index; there is no
/// entity and no time window to narrow by.
pub fn global_index_scan(
    metadata: StreamMetadata,
    conditions: Vec<Expr>,
    projection: Vec<TagProjection>,
) -> UnresolvedScan {
    UnresolvedScan {
        time_range: TimeRange::new(0, 0),
        metadata,
        conditions,
        projection,
        entity: Entity::default(),
        order_by: None,
    }
}

impl UnresolvedScan {
    /// Resolves and classifies every condition against the schema, then
    /// routes: any global-index predicate yields a `GlobalIndexScan`
    /// (at most one is allowed); otherwise the conditions land in the
    /// per-rule map of a `LocalIndexScan`.
    pub fn analyze(&self, schema: &StreamSchema) -> Result<Plan, AnalyzeError> {
        let mut condition_map = ConditionMap::new();
        let mut global_conditions: Vec<(Arc<IndexRule>, Expr)> = Vec::new();

        for condition in &self.conditions {
            let resolved = condition.resolve(schema)?;
            let tag = resolved.tag().to_string();
            let Some(rule) = schema.index_defined(&tag) else {
                return Err(AnalyzeError::IndexNotDefined(tag));
            };
            match rule.location {
                IndexLocation::Series => condition_map.push(rule, resolved),
                IndexLocation::Global => global_conditions.push((rule, resolved)),
            }
        }

        let projection_refs = if self.projection.is_empty() {
            Vec::new()
        } else {
            schema.create_ref(&self.projection)?
        };

        // A global index cannot be joined with anything else, so a single
        // predicate is all it takes.
        if global_conditions.len() > 1 {
            return Err(AnalyzeError::MultipleGlobalIndexes);
        }
        if let Some((rule, expr)) = global_conditions.pop() {
            debug!(
                target: "span_db::analyzer",
                stream = %self.metadata,
                rule = %rule,
                "Routed to global index scan"
            );
            return Ok(Plan::Global(GlobalIndexScan::new(
                schema.clone(),
                self.metadata.clone(),
                rule,
                expr,
                projection_refs,
            )));
        }

        let order_by = self
            .order_by
            .clone()
            .unwrap_or_else(|| UnresolvedOrderBy::by_time(Sort::Asc))
            .analyze(&schema.proj(&projection_refs))?;

        debug!(
            target: "span_db::analyzer",
            stream = %self.metadata,
            local_rules = condition_map.len(),
            "Routed to local index scan"
        );
        Ok(Plan::Local(LocalIndexScan::new(
            self.time_range,
            schema.clone(),
            self.metadata.clone(),
            condition_map,
            projection_refs,
            self.entity.clone(),
            order_by,
        )))
    }
}
