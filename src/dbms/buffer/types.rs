use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::dbms::storage::{disk::IDiskManager, page::Page};

use super::replacer::IBufferPoolReplacer;

pub type ReplacerGeneric = Box<dyn IBufferPoolReplacer + Send + Sync>;
pub type DiskManagerGeneric = Box<dyn IDiskManager + Send + Sync>;

/// Guards over a pinned frame. Holding one keeps the page bytes accessible
/// without holding the pool's latch; it does not keep the frame pinned by
/// itself. Drop the guard before calling back into the pool for the same
/// page.
pub type ReadOnlyPage<'a> = RwLockReadGuard<'a, Page>;
pub type WritablePage<'a> = RwLockWriteGuard<'a, Page>;
