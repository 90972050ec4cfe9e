use crate::engine::query::analyzer::{UnresolvedScan, global_index_scan, index_scan};
use crate::engine::query::expr::Expr;
use crate::engine::query::order_by::UnresolvedOrderBy;
use crate::engine::schema::registry::TagProjection;
use crate::engine::schema::types::StreamMetadata;
use crate::engine::series::entity::Entity;

pub struct IndexScanFactory {
    start_time: i64,
    end_time: i64,
    metadata: StreamMetadata,
    conditions: Vec<Expr>,
    entity: Entity,
    order_by: Option<UnresolvedOrderBy>,
    projection: Vec<TagProjection>,
}

impl IndexScanFactory {
    pub fn new() -> Self {
        Self {
            start_time: 100,
            end_time: 200,
            metadata: StreamMetadata::new("default", "sw"),
            conditions: Vec::new(),
            entity: Entity::from(vec!["svcA", "instA"]),
            order_by: None,
            projection: Vec::new(),
        }
    }

    pub fn with_time_range(mut self, start: i64, end: i64) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_condition(mut self, expr: Expr) -> Self {
        self.conditions.push(expr);
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_order_by(mut self, order_by: UnresolvedOrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_projection(mut self, family: &str, tags: &[&str]) -> Self {
        self.projection.push(TagProjection::new(family, tags));
        self
    }

    pub fn create(self) -> UnresolvedScan {
        index_scan(
            self.start_time,
            self.end_time,
            self.metadata,
            self.conditions,
            self.entity,
            self.order_by,
            self.projection,
        )
    }

    pub fn create_global(self) -> UnresolvedScan {
        global_index_scan(self.metadata, self.conditions, self.projection)
    }
}
