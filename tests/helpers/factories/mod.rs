pub mod expr_factory;
pub mod mock_storage;
pub mod scan_factory;
pub mod schema_factory;

pub use expr_factory::ExprFactory;
pub use mock_storage::{MockExecutionContext, MockItem, MockShard, SeekerCall};
pub use scan_factory::IndexScanFactory;
pub use schema_factory::StreamSchemaFactory;
