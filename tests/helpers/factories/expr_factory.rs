use crate::engine::query::expr::{BinaryExpr, CompareOp, Expr};
use crate::engine::types::TagValue;

pub struct ExprFactory {
    tag: String,
    op: CompareOp,
    value: TagValue,
}

impl ExprFactory {
    pub fn new() -> Self {
        Self {
            tag: "http.status".to_string(),
            op: CompareOp::Eq,
            value: TagValue::from("500"),
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn with_op(mut self, op: CompareOp) -> Self {
        self.op = op;
        self
    }

    pub fn with_value(mut self, value: impl Into<TagValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn create(self) -> Expr {
        Expr::Binary(BinaryExpr::new(&self.tag, self.op, self.value))
    }
}
