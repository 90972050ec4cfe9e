pub mod factories;

pub use factories::{
    ExprFactory, IndexScanFactory, MockExecutionContext, MockItem, MockShard, SeekerCall,
    StreamSchemaFactory,
};

pub struct Factory;

impl Factory {
    pub fn schema() -> StreamSchemaFactory {
        StreamSchemaFactory::new()
    }

    pub fn expr() -> ExprFactory {
        ExprFactory::new()
    }

    pub fn index_scan() -> IndexScanFactory {
        IndexScanFactory::new()
    }

    pub fn execution_context(shard_count: u32) -> MockExecutionContext {
        MockExecutionContext::with_shards(shard_count)
    }
}
