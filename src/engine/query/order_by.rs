use crate::engine::errors::AnalyzeError;
use crate::engine::schema::registry::StreamSchema;
use crate::engine::schema::types::IndexRule;
use crate::engine::types::Sort;
use std::fmt;
use std::sync::Arc;

/// Ordering request as it arrives with the unresolved plan: either by
/// time or by a named index rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedOrderBy {
    index_rule: Option<String>,
    sort: Sort,
}

impl UnresolvedOrderBy {
    pub fn by_time(sort: Sort) -> Self {
        Self {
            index_rule: None,
            sort,
        }
    }

    pub fn by_index(rule_name: &str, sort: Sort) -> Self {
        Self {
            index_rule: Some(rule_name.to_string()),
            sort,
        }
    }

    /// Resolves against the projected schema view: the named rule must be
    /// bound to the stream and every tag it covers must stay visible.
    pub fn analyze(&self, schema: &StreamSchema) -> Result<OrderBy, AnalyzeError> {
        let Some(rule_name) = &self.index_rule else {
            return Ok(OrderBy {
                index: None,
                sort: self.sort,
            });
        };
        let rule = schema.index_rule_named(rule_name).ok_or_else(|| {
            AnalyzeError::SchemaResolution(format!("order-by index rule not bound: {}", rule_name))
        })?;
        for tag in &rule.tags {
            if !schema.tag_defined(tag) {
                return Err(AnalyzeError::SchemaResolution(format!(
                    "order-by tag not in projected schema: {}",
                    tag
                )));
            }
        }
        Ok(OrderBy {
            index: Some(rule),
            sort: self.sort,
        })
    }
}

/// Analyzed ordering: a resolved index rule or time order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub index: Option<Arc<IndexRule>>,
    pub sort: Sort,
}

impl OrderBy {
    pub fn time(sort: Sort) -> Self {
        Self { index: None, sort }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.index {
            Some(rule) => write!(f, "{} {}", rule.name, self.sort),
            None => write!(f, "time {}", self.sort),
        }
    }
}
