use crate::engine::errors::QueryExecutionError;
use crate::engine::query::executor::Item;
use crate::engine::schema::types::FieldRef;
use crate::engine::types::{Tag, TagFamily};
use std::fmt;

/// Materializes the projected tag families of one item. The refs are the
/// 2-D schema-bound projection (family to tags); with no refs the element
/// carries no tag families at all. A projected tag the item cannot
/// produce is a projection failure, which aborts the scan.
pub fn project_item(
    item: &dyn Item,
    refs: &[Vec<FieldRef>],
) -> Result<Vec<TagFamily>, QueryExecutionError> {
    let mut families = Vec::with_capacity(refs.len());
    for group in refs {
        let Some(first) = group.first() else {
            continue;
        };
        let mut tags = Vec::with_capacity(group.len());
        for field_ref in group {
            let value = item
                .tag_value(&field_ref.family, &field_ref.tag.name)
                .ok_or_else(|| {
                    QueryExecutionError::Projection(format!(
                        "tag not materializable: {}",
                        field_ref
                    ))
                })?;
            tags.push(Tag {
                key: field_ref.tag.name.clone(),
                value,
            });
        }
        families.push(TagFamily {
            name: first.family.clone(),
            tags,
        });
    }
    Ok(families)
}

/// Stable textual form of a projection, used by plan `Display`.
pub fn format_refs(refs: &[Vec<FieldRef>]) -> String {
    let mut rendered = Vec::new();
    for group in refs {
        for field_ref in group {
            rendered.push(field_ref.to_string());
        }
    }
    rendered.join(",")
}

/// Helper so both scan variants print projections identically.
pub struct ProjectionDisplay<'a>(pub &'a [Vec<FieldRef>]);

impl fmt::Display for ProjectionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&format_refs(self.0))
        }
    }
}
