pub mod buffer_pool_replacer;
pub mod lru_replacer;

pub use buffer_pool_replacer::{BufferPoolReplacerError, IBufferPoolReplacer};
pub use lru_replacer::LruReplacer;
