//! In-memory page cache for a disk-backed storage engine: a fixed pool of
//! frames, a page table, and a pluggable replacement policy mediating all
//! page access between clients and the disk manager.

pub mod dbms;
