use crate::engine::errors::AnalyzeError;
use crate::engine::schema::errors::SchemaError;
use crate::engine::schema::types::{
    FieldRef, IndexLocation, IndexRule, IndexRuleBinding, RuleId, StreamMetadata, TagFamilySpec,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One tag family of a projection request: the family name plus the tags
/// to materialize from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagProjection {
    pub family: String,
    pub tags: Vec<String>,
}

impl TagProjection {
    pub fn new(family: &str, tags: &[&str]) -> Self {
        Self {
            family: family.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// The analyzer's read-only view of one stream: its tag-family layout and
/// the index rules currently bound to it. Schema mutation happens in the
/// registry, outside any plan's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSchema {
    metadata: StreamMetadata,
    tag_families: Vec<TagFamilySpec>,
    rules: Vec<Arc<IndexRule>>,
    tag_positions: HashMap<String, (usize, usize)>,
}

impl StreamSchema {
    pub fn new(
        metadata: StreamMetadata,
        tag_families: Vec<TagFamilySpec>,
        rules: Vec<Arc<IndexRule>>,
    ) -> Self {
        let mut tag_positions = HashMap::new();
        for (family_idx, family) in tag_families.iter().enumerate() {
            for (tag_idx, tag) in family.tags.iter().enumerate() {
                tag_positions.insert(tag.name.clone(), (family_idx, tag_idx));
            }
        }
        Self {
            metadata,
            tag_families,
            rules,
            tag_positions,
        }
    }

    pub fn metadata(&self) -> &StreamMetadata {
        &self.metadata
    }

    pub fn tag_families(&self) -> &[TagFamilySpec] {
        &self.tag_families
    }

    pub fn tag_defined(&self, tag: &str) -> bool {
        self.tag_positions.contains_key(tag)
    }

    /// Returns the index rule covering `tag`, if any. A tag outside the
    /// schema has no rule by definition.
    pub fn index_defined(&self, tag: &str) -> Option<Arc<IndexRule>> {
        if !self.tag_positions.contains_key(tag) {
            return None;
        }
        self.rules.iter().find(|rule| rule.covers(tag)).cloned()
    }

    pub fn index_rule_named(&self, name: &str) -> Option<Arc<IndexRule>> {
        self.rules.iter().find(|rule| rule.name == name).cloned()
    }

    /// Binds one tag name to its position in the family layout.
    pub fn field_ref(&self, tag: &str) -> Option<FieldRef> {
        let (family_idx, tag_idx) = *self.tag_positions.get(tag)?;
        let family = &self.tag_families[family_idx];
        Some(FieldRef {
            tag: family.tags[tag_idx].clone(),
            family: family.name.clone(),
            family_idx,
            tag_idx,
        })
    }

    /// Binds a projection request to the layout, one ref group per family.
    pub fn create_ref(
        &self,
        projection: &[TagProjection],
    ) -> Result<Vec<Vec<FieldRef>>, AnalyzeError> {
        let mut groups = Vec::with_capacity(projection.len());
        for proj in projection {
            let family_idx = self
                .tag_families
                .iter()
                .position(|f| f.name == proj.family)
                .ok_or_else(|| {
                    AnalyzeError::SchemaResolution(format!("tag family not found: {}", proj.family))
                })?;
            let family = &self.tag_families[family_idx];
            let mut refs = Vec::with_capacity(proj.tags.len());
            for tag_name in &proj.tags {
                let tag_idx = family
                    .tags
                    .iter()
                    .position(|t| &t.name == tag_name)
                    .ok_or_else(|| {
                        AnalyzeError::SchemaResolution(format!(
                            "tag not found in family {}: {}",
                            proj.family, tag_name
                        ))
                    })?;
                refs.push(FieldRef {
                    tag: family.tags[tag_idx].clone(),
                    family: family.name.clone(),
                    family_idx,
                    tag_idx,
                });
            }
            groups.push(refs);
        }
        Ok(groups)
    }

    /// The projected view: only the referenced tags remain visible. With
    /// no refs the view is the schema itself.
    pub fn proj(&self, refs: &[Vec<FieldRef>]) -> StreamSchema {
        if refs.is_empty() {
            return self.clone();
        }
        let tag_families = refs
            .iter()
            .filter(|group| !group.is_empty())
            .map(|group| TagFamilySpec {
                name: group[0].family.clone(),
                tags: group.iter().map(|r| r.tag.clone()).collect(),
            })
            .collect();
        StreamSchema::new(self.metadata.clone(), tag_families, self.rules.clone())
    }
}

/// Registry of stream definitions, index rules, and the bindings that
/// attach rules to streams for a validity window.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    streams: HashMap<StreamMetadata, Vec<TagFamilySpec>>,
    rules: HashMap<(String, String), Arc<IndexRule>>,
    bindings: Vec<IndexRuleBinding>,
    next_rule_id: u32,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_stream(
        &mut self,
        metadata: StreamMetadata,
        tag_families: Vec<TagFamilySpec>,
    ) -> Result<(), SchemaError> {
        if self.streams.contains_key(&metadata) {
            return Err(SchemaError::AlreadyDefined(metadata.to_string()));
        }
        if tag_families.is_empty() {
            return Err(SchemaError::EmptySchema(metadata.to_string()));
        }
        self.streams.insert(metadata, tag_families);
        Ok(())
    }

    /// Interns a rule and hands back its shared handle. The `RuleId` is
    /// assigned here and never reused.
    pub fn define_index_rule(
        &mut self,
        group: &str,
        name: &str,
        tags: Vec<String>,
        location: IndexLocation,
    ) -> Result<Arc<IndexRule>, SchemaError> {
        let key = (group.to_string(), name.to_string());
        if self.rules.contains_key(&key) {
            return Err(SchemaError::AlreadyDefined(name.to_string()));
        }
        let rule = Arc::new(IndexRule {
            id: RuleId(self.next_rule_id),
            name: name.to_string(),
            tags,
            location,
        });
        self.next_rule_id += 1;
        self.rules.insert(key, rule.clone());
        Ok(rule)
    }

    pub fn define_binding(&mut self, binding: IndexRuleBinding) -> Result<(), SchemaError> {
        for rule_name in &binding.rules {
            let key = (binding.subject.group.clone(), rule_name.clone());
            if !self.rules.contains_key(&key) {
                return Err(SchemaError::RuleNotFound(rule_name.clone()));
            }
        }
        self.bindings.push(binding);
        Ok(())
    }

    pub fn get_index_rule(&self, group: &str, name: &str) -> Option<Arc<IndexRule>> {
        self.rules.get(&(group.to_string(), name.to_string())).cloned()
    }

    /// Collects the rules of every binding whose validity window covers
    /// `now` and whose subject matches the stream. Expired and future
    /// bindings are skipped; duplicates collapse to one handle.
    pub fn index_rules(&self, subject: &StreamMetadata, now: i64) -> Vec<Arc<IndexRule>> {
        let mut result: Vec<Arc<IndexRule>> = Vec::new();
        for binding in &self.bindings {
            if !binding.active_at(now) || &binding.subject != subject {
                continue;
            }
            for rule_name in &binding.rules {
                let key = (subject.group.clone(), rule_name.clone());
                if let Some(rule) = self.rules.get(&key) {
                    if !result.iter().any(|r| r.id == rule.id) {
                        result.push(rule.clone());
                    }
                }
            }
        }
        debug!(
            target: "span_db::schema",
            stream = %subject,
            rules = result.len(),
            "Resolved active index rules"
        );
        result
    }

    /// Builds the analyzer's schema view for one stream at `now`.
    pub fn stream_schema(
        &self,
        subject: &StreamMetadata,
        now: i64,
    ) -> Result<StreamSchema, SchemaError> {
        let tag_families = self
            .streams
            .get(subject)
            .ok_or_else(|| SchemaError::StreamNotFound(subject.to_string()))?;
        let rules = self.index_rules(subject, now);
        Ok(StreamSchema::new(
            subject.clone(),
            tag_families.clone(),
            rules,
        ))
    }
}
