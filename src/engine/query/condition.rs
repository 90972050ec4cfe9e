use crate::engine::query::expr::{CompareOp, Expr};
use crate::engine::schema::types::{IndexRule, RuleId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// One storage-level predicate on a tag: the operator plus the canonical
/// byte encodings of the literal (one entry per array element).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionValue {
    pub values: Vec<Vec<u8>>,
    pub op: CompareOp,
}

/// What a per-rule filter receives: tag name to conjunctive predicate
/// list.
pub type TagCondition = HashMap<String, Vec<ConditionValue>>;

/// Flattens a per-rule expression list into the storage condition.
/// Multiple expressions on the same tag stay conjunctive.
pub fn exprs_to_condition(exprs: &[Expr]) -> TagCondition {
    let mut condition: TagCondition = HashMap::new();
    for expr in exprs {
        let Expr::Binary(b) = expr;
        condition
            .entry(b.tag.clone())
            .or_default()
            .push(ConditionValue {
                values: b.value.bytes(),
                op: b.op,
            });
    }
    condition
}

/// Expressions grouped under one SERIES-LOCAL index rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConditions {
    pub rule: Arc<IndexRule>,
    pub exprs: Vec<Expr>,
}

/// Local-plan state: rule identity to its ordered expression list. Keyed
/// by the interned `RuleId` so two handles to the same rule collapse to
/// one entry, and iteration order is stable for display and storage
/// submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionMap {
    entries: BTreeMap<RuleId, RuleConditions>,
}

impl ConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Arc<IndexRule>, expr: Expr) {
        self.entries
            .entry(rule.id)
            .or_insert_with(|| RuleConditions {
                rule,
                exprs: Vec::new(),
            })
            .exprs
            .push(expr);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleConditions> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: RuleId) -> Option<&RuleConditions> {
        self.entries.get(&id)
    }
}

impl fmt::Display for ConditionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .entries
            .values()
            .map(|rc| {
                let exprs: Vec<String> = rc.exprs.iter().map(|e| e.to_string()).collect();
                format!("({})", exprs.join(" AND "))
            })
            .collect();
        f.write_str(&groups.join(" AND "))
    }
}
