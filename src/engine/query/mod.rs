pub mod analyzer;
pub mod condition;
pub mod executor;
pub mod expr;
pub mod global_scan;
pub mod local_scan;
pub mod merge;
pub mod order_by;
pub mod plan;
pub mod projection;

pub use analyzer::{UnresolvedScan, global_index_scan, index_scan};
pub use plan::{Plan, PlanType};
