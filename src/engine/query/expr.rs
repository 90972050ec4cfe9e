use crate::engine::errors::AnalyzeError;
use crate::engine::schema::registry::StreamSchema;
use crate::engine::schema::types::FieldRef;
use crate::engine::types::TagValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "IN",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The predicate AST reaching the scan core. Only binary predicates of
/// shape `tag op literal` are representable here; compound boolean trees
/// are flattened into per-rule conjunctions upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryExpr),
}

impl Expr {
    pub fn eq(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Eq, value.into()))
    }

    pub fn ne(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Ne, value.into()))
    }

    pub fn lt(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Lt, value.into()))
    }

    pub fn le(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Le, value.into()))
    }

    pub fn gt(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Gt, value.into()))
    }

    pub fn ge(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::Ge, value.into()))
    }

    pub fn is_in(tag: &str, value: impl Into<TagValue>) -> Self {
        Expr::Binary(BinaryExpr::new(tag, CompareOp::In, value.into()))
    }

    pub fn tag(&self) -> &str {
        match self {
            Expr::Binary(b) => &b.tag,
        }
    }

    /// The bound reference, present only after `resolve`.
    pub fn field_ref(&self) -> Option<&FieldRef> {
        match self {
            Expr::Binary(b) => b.field.as_ref(),
        }
    }

    /// Binds the tag reference against the schema, producing the resolved
    /// form. A tag the stream does not carry cannot be indexed either, so
    /// the failure surfaces as `IndexNotDefined`.
    pub fn resolve(&self, schema: &StreamSchema) -> Result<Expr, AnalyzeError> {
        match self {
            Expr::Binary(b) => Ok(Expr::Binary(b.resolve(schema)?)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary(b) => write!(f, "{}", b),
        }
    }
}

/// `tag op literal`, optionally carrying the schema-bound field ref.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub tag: String,
    pub op: CompareOp,
    pub value: TagValue,
    field: Option<FieldRef>,
}

impl BinaryExpr {
    pub fn new(tag: &str, op: CompareOp, value: TagValue) -> Self {
        Self {
            tag: tag.to_string(),
            op,
            value,
            field: None,
        }
    }

    pub fn field(&self) -> Option<&FieldRef> {
        self.field.as_ref()
    }

    fn resolve(&self, schema: &StreamSchema) -> Result<BinaryExpr, AnalyzeError> {
        let field = schema
            .field_ref(&self.tag)
            .ok_or_else(|| AnalyzeError::IndexNotDefined(self.tag.clone()))?;
        Ok(BinaryExpr {
            tag: self.tag.clone(),
            op: self.op,
            value: self.value.clone(),
            field: Some(field),
        })
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.tag, self.op, self.value)
    }
}
