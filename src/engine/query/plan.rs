use crate::engine::errors::QueryExecutionError;
use crate::engine::query::executor::ExecutionContext;
use crate::engine::query::global_scan::GlobalIndexScan;
use crate::engine::query::local_scan::LocalIndexScan;
use crate::engine::schema::registry::StreamSchema;
use crate::engine::types::Element;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanType {
    LocalIndexScan,
    GlobalIndexScan,
}

/// An analyzed, executable plan. Immutable after analysis; consumed once
/// per execution and freely shareable across tasks in between.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Local(LocalIndexScan),
    Global(GlobalIndexScan),
}

impl Plan {
    pub fn plan_type(&self) -> PlanType {
        match self {
            Plan::Local(_) => PlanType::LocalIndexScan,
            Plan::Global(_) => PlanType::GlobalIndexScan,
        }
    }

    /// Scans are leaves of the plan tree.
    pub fn children(&self) -> &[Plan] {
        &[]
    }

    /// The projected schema view this plan produces.
    pub fn schema(&self) -> StreamSchema {
        match self {
            Plan::Local(scan) => scan.schema(),
            Plan::Global(scan) => scan.schema(),
        }
    }

    pub async fn execute(
        &self,
        ec: &dyn ExecutionContext,
    ) -> Result<Vec<Element>, QueryExecutionError> {
        match self {
            Plan::Local(scan) => scan.execute(ec).await,
            Plan::Global(scan) => scan.execute(ec).await,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Local(scan) => write!(f, "{}", scan),
            Plan::Global(scan) => write!(f, "{}", scan),
        }
    }
}
