pub mod errors;
pub mod registry;
pub mod types;

pub use types::{
    FieldRef, IndexLocation, IndexRule, IndexRuleBinding, RuleId, StreamMetadata, TagFamilySpec,
    TagSpec, TagType,
};
