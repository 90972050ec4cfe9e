use crate::engine::schema::registry::StreamSchema;
use crate::engine::schema::types::{
    IndexLocation, IndexRule, RuleId, StreamMetadata, TagFamilySpec, TagSpec, TagType,
};
use std::sync::Arc;

/// Builds a `StreamSchema` with the standard test layout: a `searchable`
/// family for indexed tags and a `trace` family for payload tags. Rules
/// are added per test; ids are interned in insertion order.
pub struct StreamSchemaFactory {
    metadata: StreamMetadata,
    families: Vec<TagFamilySpec>,
    rules: Vec<Arc<IndexRule>>,
    next_rule_id: u32,
}

impl StreamSchemaFactory {
    pub fn new() -> Self {
        Self {
            metadata: StreamMetadata::new("default", "sw"),
            families: vec![
                TagFamilySpec {
                    name: "searchable".to_string(),
                    tags: vec![
                        TagSpec::new("service", TagType::Str),
                        TagSpec::new("instance", TagType::Str),
                        TagSpec::new("http.status", TagType::Str),
                        TagSpec::new("endpoint", TagType::Str),
                        TagSpec::new("duration", TagType::Int),
                    ],
                },
                TagFamilySpec {
                    name: "trace".to_string(),
                    tags: vec![
                        TagSpec::new("trace_id", TagType::Str),
                        TagSpec::new("span_id", TagType::Str),
                    ],
                },
            ],
            rules: Vec::new(),
            next_rule_id: 0,
        }
    }

    pub fn with_metadata(mut self, group: &str, name: &str) -> Self {
        self.metadata = StreamMetadata::new(group, name);
        self
    }

    pub fn with_family(mut self, name: &str, tags: &[(&str, TagType)]) -> Self {
        self.families.push(TagFamilySpec {
            name: name.to_string(),
            tags: tags
                .iter()
                .map(|(tag, tag_type)| TagSpec::new(tag, *tag_type))
                .collect(),
        });
        self
    }

    pub fn with_series_rule(self, name: &str, tags: &[&str]) -> Self {
        self.with_rule(name, tags, IndexLocation::Series)
    }

    pub fn with_global_rule(self, name: &str, tags: &[&str]) -> Self {
        self.with_rule(name, tags, IndexLocation::Global)
    }

    fn with_rule(mut self, name: &str, tags: &[&str], location: IndexLocation) -> Self {
        self.rules.push(Arc::new(IndexRule {
            id: RuleId(self.next_rule_id),
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            location,
        }));
        self.next_rule_id += 1;
        self
    }

    pub fn rule(&self, name: &str) -> Arc<IndexRule> {
        self.rules
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .expect("rule defined by the factory")
    }

    pub fn create(&self) -> StreamSchema {
        StreamSchema::new(
            self.metadata.clone(),
            self.families.clone(),
            self.rules.clone(),
        )
    }
}
