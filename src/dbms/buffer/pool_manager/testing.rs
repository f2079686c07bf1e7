use crate::dbms::{
    buffer::replacer::lru_replacer::LruReplacer, storage::disk::testing::InMemoryDiskManager,
};

use super::BufferPoolManager;

pub fn create_testing_pool_manager(pool_size: usize) -> BufferPoolManager {
    let disk_manager = InMemoryDiskManager::new();
    let replacer = LruReplacer::new(pool_size);
    BufferPoolManager::new(pool_size, Box::new(replacer), Box::new(disk_manager))
}
