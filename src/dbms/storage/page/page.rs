use crate::dbms::types::{PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};

/// Contents of a single buffer pool frame: one page's bytes plus the
/// bookkeeping the pool needs to decide when the frame can be reused.
///
/// A freshly constructed or reset `Page` holds no page: its id is
/// [`INVALID_PAGE_ID`], its pin count is zero, and it is clean.
pub struct Page {
    page_id: PageId,
    pin_count: usize,
    is_dirty: bool,
    data: Box<PageData>,
}

impl Page {
    pub fn new() -> Page {
        Page {
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
            data: Box::new([0; PAGE_SIZE]),
        }
    }

    /// Get the id of the resident page, or [`INVALID_PAGE_ID`] if the frame
    /// is free.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Get the number of outstanding references to this frame.
    pub fn pin_count(&self) -> usize {
        self.pin_count
    }

    /// Get whether the in-memory bytes differ from the on-disk copy.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Get a readable view of the page's data.
    pub fn data(&self) -> &PageData {
        &self.data
    }

    /// Overwrite the whole page, marking it dirty.
    pub fn set_data(&mut self, data: PageData) {
        self.write_data(0, &data);
    }

    /// Write a slice of the page starting at the given offset, marking it
    /// dirty.
    ///
    /// # Panics
    ///
    /// Panics if `offset + data.len()` exceeds [`PAGE_SIZE`].
    pub fn write_data(&mut self, offset: usize, data: &[u8]) {
        self.is_dirty = true;
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Install a page into this frame: id and bytes are taken from the
    /// caller, the pin count starts at one, and the frame is clean.
    pub(crate) fn load(&mut self, page_id: PageId, data: PageData) {
        self.page_id = page_id;
        self.pin_count = 1;
        self.is_dirty = false;
        self.data.copy_from_slice(&data);
    }

    /// Return the frame to its free state: no page, no pins, clean, zeroed.
    pub(crate) fn reset(&mut self) {
        self.page_id = INVALID_PAGE_ID;
        self.pin_count = 0;
        self.is_dirty = false;
        self.data.fill(0);
    }

    pub(crate) fn increment_pin_count(&mut self) {
        self.pin_count += 1;
    }

    /// Decrement the pin count, saturating at zero.
    pub(crate) fn decrement_pin_count(&mut self) {
        self.pin_count = self.pin_count.saturating_sub(1);
    }

    pub(crate) fn set_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub(crate) fn set_clean(&mut self) {
        self.is_dirty = false;
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
