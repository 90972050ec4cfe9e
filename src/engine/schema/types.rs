use serde::{Deserialize, Serialize};
use std::fmt;

/// Group-qualified name of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub group: String,
    pub name: String,
}

impl StreamMetadata {
    pub fn new(group: &str, name: &str) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for StreamMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagType {
    Str,
    Int,
    StrArray,
    IntArray,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    pub name: String,
    pub tag_type: TagType,
}

impl TagSpec {
    pub fn new(name: &str, tag_type: TagType) -> Self {
        Self {
            name: name.to_string(),
            tag_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFamilySpec {
    pub name: String,
    pub tags: Vec<TagSpec>,
}

/// Interned identity of an index rule. Assigned once by the registry;
/// rule equality and condition-map keys go through this id, never through
/// structural comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexLocation {
    /// Evaluated inside a series' block scan.
    Series,
    /// Cross-series inverted lookup.
    Global,
}

/// One index definition: which tags it covers and where it lives.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct IndexRule {
    pub id: RuleId,
    pub name: String,
    pub tags: Vec<String>,
    pub location: IndexLocation,
}

impl IndexRule {
    pub fn covers(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl PartialEq for IndexRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for IndexRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Binds a set of index rules to a stream for a validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRuleBinding {
    pub name: String,
    pub subject: StreamMetadata,
    /// Rule names, resolved through the registry.
    pub rules: Vec<String>,
    /// Nanoseconds since the epoch, inclusive.
    pub begin_at: i64,
    /// Nanoseconds since the epoch, inclusive.
    pub expire_at: i64,
}

impl IndexRuleBinding {
    pub fn active_at(&self, now: i64) -> bool {
        self.begin_at <= now && now <= self.expire_at
    }
}

/// A schema-bound reference to one tag: its `TagSpec` plus its position
/// in the stream's tag-family layout. Produced by `StreamSchema::create_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub tag: TagSpec,
    pub family: String,
    pub family_idx: usize,
    pub tag_idx: usize,
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.tag.name)
    }
}
