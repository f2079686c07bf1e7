use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use log::warn;

use crate::dbms::buffer::replacer::BufferPoolReplacerError;
use crate::dbms::buffer::types::{
    DiskManagerGeneric, ReadOnlyPage, ReplacerGeneric, WritablePage,
};
use crate::dbms::storage::disk::DiskManagerError;
use crate::dbms::storage::page::Page;
use crate::dbms::types::{FrameId, PageId, PAGE_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum BufferPoolManagerError {
    /// Unable to free up a frame: every frame is pinned
    #[error("no free or evictable frame available")]
    NoFrameAvailable,
    /// The requested page is not in the buffer pool
    #[error("page not in buffer pool")]
    PageNotInPool,
    /// The page has outstanding pins and cannot be deleted
    #[error("page is pinned")]
    PagePinned,
    #[error(transparent)]
    ReplacerError(#[from] BufferPoolReplacerError),
    #[error(transparent)]
    DiskManagerError(#[from] DiskManagerError),
}

pub trait IBufferPoolManager {
    /// Fetch the requested page as readable from the buffer pool, loading it
    /// from disk if it is not resident. Every successful fetch adds one pin;
    /// balance it with a later `unpin_page`.
    fn fetch_page(&self, page_id: PageId) -> Result<ReadOnlyPage, BufferPoolManagerError>;
    /// Fetch the requested page as writable from the buffer pool.
    fn fetch_page_writable(&self, page_id: PageId)
        -> Result<WritablePage, BufferPoolManagerError>;
    /// Create a new zeroed page, returning its id and the frame as writable.
    /// The page starts with one pin.
    fn new_page(&self) -> Result<(PageId, WritablePage), BufferPoolManagerError>;
    /// Drop one pin on the target page. `is_dirty` is ORed into the frame's
    /// dirty bit; once the pin count reaches zero the frame becomes a
    /// candidate for eviction.
    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), BufferPoolManagerError>;
    /// Write the target page to disk and mark it clean. The pin count is
    /// left untouched; pinned pages may be flushed.
    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
    /// Remove a page from the buffer pool and deallocate it on disk. Fails
    /// with [`BufferPoolManagerError::PagePinned`] while anyone holds a pin.
    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
    /// Write every resident page to disk. Pages whose write-back fails are
    /// logged and skipped.
    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError>;
}

/// Page table and free list, guarded as one unit by the pool's latch so they
/// can never disagree about which frame holds which page.
struct PoolState {
    /// page_id -> frame_id
    page_table: HashMap<PageId, FrameId>,
    free_list: VecDeque<FrameId>,
}

pub struct BufferPoolManager {
    /// Serializes all public operations end to end, disk I/O included.
    latch: Mutex<PoolState>,
    /// Own mutex, independent of the latch, so the policy stays reusable
    /// and testable in isolation.
    replacer: Mutex<ReplacerGeneric>,
    disk_manager: Mutex<DiskManagerGeneric>,
    /// One slot per frame. Clients hold a slot's lock, never the latch,
    /// while reading or writing a pinned page.
    pages: Vec<RwLock<Page>>,
}

impl BufferPoolManager {
    pub fn new(
        pool_size: usize,
        replacer: ReplacerGeneric,
        disk_manager: DiskManagerGeneric,
    ) -> BufferPoolManager {
        BufferPoolManager {
            latch: Mutex::new(PoolState {
                page_table: HashMap::new(),
                // Initially, every frame is in the free list.
                free_list: (0..pool_size).collect(),
            }),
            replacer: Mutex::new(replacer),
            disk_manager: Mutex::new(disk_manager),
            pages: (0..pool_size).map(|_| RwLock::new(Page::new())).collect(),
        }
    }

    /// Total number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pages.len()
    }

    /// Number of frames that could hold a new page right now: free frames
    /// plus evictable ones.
    pub fn available_frame_count(&self) -> usize {
        let state = self.latch.lock().unwrap();
        let replacer = self.replacer.lock().unwrap();
        state.free_list.len() + replacer.size().unwrap_or(0)
    }

    /// Pin count of a resident page, or `None` if it is not in the pool.
    pub fn page_pin_count(&self, page_id: PageId) -> Option<usize> {
        let state = self.latch.lock().unwrap();
        let &frame_id = state.page_table.get(&page_id)?;
        Some(self.pages[frame_id].read().unwrap().pin_count())
    }

    /// Take a frame for reuse: the free list first, in FIFO order, and only
    /// when it is empty ask the replacer for a victim. An evicted dirty page
    /// is written back before the frame is handed out, and its page-table
    /// entry is removed.
    fn find_replacement(
        &self,
        state: &mut PoolState,
        replacer: &mut ReplacerGeneric,
        disk_manager: &mut DiskManagerGeneric,
    ) -> Result<FrameId, BufferPoolManagerError> {
        if let Some(frame_id) = state.free_list.pop_front() {
            return Ok(frame_id);
        }

        let frame_id = replacer
            .victim()?
            .ok_or(BufferPoolManagerError::NoFrameAvailable)?;

        let mut victim = self.pages[frame_id].write().unwrap();
        // The evicted page's bytes must be durable before the frame is
        // reused.
        if victim.is_dirty() {
            disk_manager.write_page(victim.page_id(), victim.data())?;
        }
        state.page_table.remove(&victim.page_id());
        victim.reset();

        Ok(frame_id)
    }

    /// Fetch a page, from disk if needed, and return the id of the frame
    /// holding it with one pin added.
    fn fetch_page_frame(&self, page_id: PageId) -> Result<FrameId, BufferPoolManagerError> {
        let mut state = self.latch.lock().unwrap();
        let mut replacer = self.replacer.lock().unwrap();

        // 1.  Search the page table for the requested page (P).
        if let Some(&frame_id) = state.page_table.get(&page_id) {
            // 1.1  P is resident: add a pin and make sure the frame is no
            //      longer an eviction candidate.
            let mut page = self.pages[frame_id].write().unwrap();
            page.increment_pin_count();
            replacer.pin(frame_id)?;
            return Ok(frame_id);
        }

        // 1.2  P is not resident: find a replacement frame (R), from the
        //      free list or the replacer, writing back R's old page if dirty.
        let mut disk_manager = self.disk_manager.lock().unwrap();
        let frame_id = self.find_replacement(&mut state, &mut replacer, &mut disk_manager)?;

        // 2.  Read P's bytes into R. A failed read must not leak the frame:
        //     hand it back to the free list and surface the error.
        let data = match disk_manager.read_page(page_id) {
            Ok(data) => data,
            Err(e) => {
                self.pages[frame_id].write().unwrap().reset();
                state.free_list.push_back(frame_id);
                return Err(e.into());
            }
        };

        // 3.  Install P's metadata and map it in the page table.
        self.pages[frame_id].write().unwrap().load(page_id, data);
        state.page_table.insert(page_id, frame_id);

        Ok(frame_id)
    }

    /// Write-back step shared by `flush_page` and `flush_all_pages`, run
    /// under an already-held latch so `flush_all_pages` never re-enters the
    /// public API.
    fn flush_frame(
        &self,
        frame_id: FrameId,
        page_id: PageId,
        disk_manager: &mut DiskManagerGeneric,
    ) -> Result<(), BufferPoolManagerError> {
        let mut page = self.pages[frame_id].write().unwrap();
        disk_manager.write_page(page_id, page.data())?;
        page.set_clean();
        Ok(())
    }
}

impl IBufferPoolManager for BufferPoolManager {
    fn fetch_page(&self, page_id: PageId) -> Result<ReadOnlyPage, BufferPoolManagerError> {
        let frame_id = self.fetch_page_frame(page_id)?;
        // The pin taken above keeps the frame from being recycled between
        // releasing the latch and acquiring the page lock.
        Ok(self.pages[frame_id].read().unwrap())
    }

    fn fetch_page_writable(
        &self,
        page_id: PageId,
    ) -> Result<WritablePage, BufferPoolManagerError> {
        let frame_id = self.fetch_page_frame(page_id)?;
        Ok(self.pages[frame_id].write().unwrap())
    }

    fn new_page(&self) -> Result<(PageId, WritablePage), BufferPoolManagerError> {
        let mut state = self.latch.lock().unwrap();
        let mut replacer = self.replacer.lock().unwrap();
        let mut disk_manager = self.disk_manager.lock().unwrap();

        // 1.  Secure a frame before allocating, so a fully pinned pool does
        //     not leak page ids.
        let frame_id = self.find_replacement(&mut state, &mut replacer, &mut disk_manager)?;

        let page_id = match disk_manager.allocate_page() {
            Ok(page_id) => page_id,
            Err(e) => {
                // The frame came out reset; put it back where free frames go.
                state.free_list.push_back(frame_id);
                return Err(e.into());
            }
        };

        // 2.  Zero the frame, install the new page's metadata, and map it.
        self.pages[frame_id]
            .write()
            .unwrap()
            .load(page_id, [0u8; PAGE_SIZE]);
        state.page_table.insert(page_id, frame_id);

        drop(disk_manager);
        drop(replacer);
        drop(state);
        Ok((page_id, self.pages[frame_id].write().unwrap()))
    }

    fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), BufferPoolManagerError> {
        let state = self.latch.lock().unwrap();

        let &frame_id = state
            .page_table
            .get(&page_id)
            .ok_or(BufferPoolManagerError::PageNotInPool)?;

        let mut page = self.pages[frame_id].write().unwrap();
        page.decrement_pin_count();
        if is_dirty {
            // Sticky: stays set until a write-back clears it.
            page.set_dirty();
        }

        if page.pin_count() == 0 {
            self.replacer.lock().unwrap().unpin(frame_id)?;
        }
        Ok(())
    }

    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let state = self.latch.lock().unwrap();

        let &frame_id = state
            .page_table
            .get(&page_id)
            .ok_or(BufferPoolManagerError::PageNotInPool)?;

        let mut disk_manager = self.disk_manager.lock().unwrap();
        self.flush_frame(frame_id, page_id, &mut disk_manager)
    }

    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let mut state = self.latch.lock().unwrap();
        let mut disk_manager = self.disk_manager.lock().unwrap();

        // The on-disk page goes away whether or not it is resident.
        disk_manager.deallocate_page(page_id)?;

        let frame_id = match state.page_table.get(&page_id) {
            Some(&frame_id) => frame_id,
            // Not resident: nothing to do in memory.
            None => return Ok(()),
        };

        let mut page = self.pages[frame_id].write().unwrap();
        if page.pin_count() > 0 {
            return Err(BufferPoolManagerError::PagePinned);
        }

        // The frame sits in the replacer (pin count is zero); pull it out
        // before recycling.
        self.replacer.lock().unwrap().pin(frame_id)?;
        state.page_table.remove(&page_id);
        page.reset();
        state.free_list.push_back(frame_id);

        Ok(())
    }

    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError> {
        let state = self.latch.lock().unwrap();
        let mut disk_manager = self.disk_manager.lock().unwrap();

        for (&page_id, &frame_id) in state.page_table.iter() {
            if let Err(e) = self.flush_frame(frame_id, page_id, &mut disk_manager) {
                warn!("failed to flush page {}: {}", page_id, e);
            }
        }
        Ok(())
    }
}
