use crate::engine::errors::QueryExecutionError;
use crate::engine::query::condition::exprs_to_condition;
use crate::engine::query::executor::ExecutionContext;
use crate::engine::query::expr::Expr;
use crate::engine::query::projection::{ProjectionDisplay, project_item};
use crate::engine::schema::registry::StreamSchema;
use crate::engine::schema::types::{FieldRef, IndexRule, StreamMetadata};
use crate::engine::types::Element;
use std::fmt;
use std::slice;
use std::sync::Arc;
use tracing::{debug, info};

/// Single-index lookup that bypasses the series fan-out: the global index
/// is a cross-series inverted lookup, so no entity path and no time-range
/// narrowing apply. Elements come back in shard-enumeration order, then
/// lookup order within a shard.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalIndexScan {
    schema: StreamSchema,
    metadata: StreamMetadata,
    rule: Arc<IndexRule>,
    expr: Expr,
    projection_refs: Vec<Vec<FieldRef>>,
}

impl GlobalIndexScan {
    pub(crate) fn new(
        schema: StreamSchema,
        metadata: StreamMetadata,
        rule: Arc<IndexRule>,
        expr: Expr,
        projection_refs: Vec<Vec<FieldRef>>,
    ) -> Self {
        Self {
            schema,
            metadata,
            rule,
            expr,
            projection_refs,
        }
    }

    pub fn rule(&self) -> &Arc<IndexRule> {
        &self.rule
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn schema(&self) -> StreamSchema {
        self.schema.proj(&self.projection_refs)
    }

    pub async fn execute(
        &self,
        ec: &dyn ExecutionContext,
    ) -> Result<Vec<Element>, QueryExecutionError> {
        let shards = ec.shards(None).await?;
        debug!(
            target: "engine::query::global_scan",
            stream = %self.metadata,
            rule = %self.rule,
            shard_count = shards.len(),
            "Consulting global index"
        );

        let condition = exprs_to_condition(slice::from_ref(&self.expr));
        let mut elements = Vec::new();
        for shard in &shards {
            let items = shard.lookup_global(&self.rule, &condition).await?;
            for item in items {
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
        }

        info!(
            target: "engine::query::global_scan",
            stream = %self.metadata,
            count = elements.len(),
            "Global index scan completed"
        );
        Ok(elements)
    }
}

impl fmt::Display for GlobalIndexScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GlobalIndexScan: Metadata{{group={},name={}}},rule={},conditions=({}); projection={}",
            self.metadata.group,
            self.metadata.name,
            self.rule,
            self.expr,
            ProjectionDisplay(&self.projection_refs),
        )
    }
}
