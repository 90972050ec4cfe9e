use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("stream already defined: {0}")]
    AlreadyDefined(String),

    #[error("stream not found: {0}")]
    StreamNotFound(String),

    #[error("index rule not found: {0}")]
    RuleNotFound(String),

    #[error("stream has no tag families: {0}")]
    EmptySchema(String),
}
