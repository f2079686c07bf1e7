use hashlink::LinkedHashSet;

use crate::dbms::types::FrameId;

use super::buffer_pool_replacer::{BufferPoolReplacerError, IBufferPoolReplacer};

/// Least-recently-used eviction policy.
///
/// Frames are ordered by the time of their most recent `unpin`; `victim`
/// removes and returns the least recently unpinned one. The insertion-ordered
/// set gives O(1) insert at the MRU end, O(1) removal by frame id, and O(1)
/// pop at the LRU end.
pub struct LruReplacer {
    /// Front is the least recently unpinned frame.
    lru_list: LinkedHashSet<FrameId>,
    capacity: usize,
}

impl LruReplacer {
    /// Creates a new [`LruReplacer`] tracking frames `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        LruReplacer {
            lru_list: LinkedHashSet::with_capacity(capacity),
            capacity,
        }
    }

    fn check_frame_id(&self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        if frame_id >= self.capacity {
            return Err(BufferPoolReplacerError::FrameOutOfRange(format!(
                "frame_id {} is out of range",
                frame_id
            )));
        }
        Ok(())
    }
}

impl IBufferPoolReplacer for LruReplacer {
    fn victim(&mut self) -> Result<Option<FrameId>, BufferPoolReplacerError> {
        Ok(self.lru_list.pop_front())
    }

    fn pin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        self.check_frame_id(frame_id)?;
        self.lru_list.remove(&frame_id);
        Ok(())
    }

    fn unpin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        self.check_frame_id(frame_id)?;
        // Already tracked: keep the existing position. The pool only unpins
        // on the 1 -> 0 pin transition, so a duplicate call must not refresh
        // recency.
        if !self.lru_list.contains(&frame_id) {
            self.lru_list.insert(frame_id);
        }
        Ok(())
    }

    fn size(&self) -> Result<usize, BufferPoolReplacerError> {
        Ok(self.lru_list.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty_replacer_has_no_victim() {
        let mut replacer = LruReplacer::new(3);
        assert_eq!(replacer.size(), Ok(0));
        assert_eq!(replacer.victim(), Ok(None));
    }

    #[rstest]
    fn test_victim_in_unpin_order() {
        let mut replacer = LruReplacer::new(3);
        replacer.unpin(0).unwrap();
        replacer.unpin(1).unwrap();
        replacer.unpin(2).unwrap();
        assert_eq!(replacer.size(), Ok(3));

        assert_eq!(replacer.victim(), Ok(Some(0)));
        assert_eq!(replacer.victim(), Ok(Some(1)));
        assert_eq!(replacer.victim(), Ok(Some(2)));
        assert_eq!(replacer.victim(), Ok(None));
        assert_eq!(replacer.size(), Ok(0));
    }

    #[rstest]
    fn test_unpin_is_idempotent() {
        let mut replacer = LruReplacer::new(3);
        replacer.unpin(0).unwrap();
        replacer.unpin(1).unwrap();
        // Duplicate unpin must not move frame 0 to the MRU end.
        replacer.unpin(0).unwrap();

        assert_eq!(replacer.size(), Ok(2));
        assert_eq!(replacer.victim(), Ok(Some(0)));
        assert_eq!(replacer.victim(), Ok(Some(1)));
    }

    #[rstest]
    fn test_pin_removes_candidate() {
        let mut replacer = LruReplacer::new(3);
        replacer.unpin(0).unwrap();
        replacer.unpin(1).unwrap();
        replacer.unpin(2).unwrap();

        replacer.pin(1).unwrap();

        assert_eq!(replacer.size(), Ok(2));
        assert_eq!(replacer.victim(), Ok(Some(0)));
        assert_eq!(replacer.victim(), Ok(Some(2)));
        assert_eq!(replacer.victim(), Ok(None));
    }

    #[rstest]
    fn test_pin_untracked_frame_is_noop() {
        let mut replacer = LruReplacer::new(3);
        replacer.unpin(0).unwrap();

        replacer.pin(2).unwrap();

        assert_eq!(replacer.size(), Ok(1));
        assert_eq!(replacer.victim(), Ok(Some(0)));
    }

    #[rstest]
    fn test_pin_then_unpin_moves_to_mru_end() {
        let mut replacer = LruReplacer::new(3);
        replacer.unpin(0).unwrap();
        replacer.unpin(1).unwrap();
        replacer.unpin(2).unwrap();

        // A pin/unpin cycle is a fresh insertion at the MRU end.
        replacer.pin(0).unwrap();
        replacer.unpin(0).unwrap();

        assert_eq!(replacer.victim(), Ok(Some(1)));
        assert_eq!(replacer.victim(), Ok(Some(2)));
        assert_eq!(replacer.victim(), Ok(Some(0)));
    }

    #[rstest]
    #[case(3)]
    #[case(7)]
    #[case(100)]
    fn test_out_of_range_frame_rejected(#[case] frame_id: FrameId) {
        let mut replacer = LruReplacer::new(3);

        assert_eq!(
            replacer.unpin(frame_id),
            Err(BufferPoolReplacerError::FrameOutOfRange(format!(
                "frame_id {} is out of range",
                frame_id
            )))
        );
        assert_eq!(
            replacer.pin(frame_id),
            Err(BufferPoolReplacerError::FrameOutOfRange(format!(
                "frame_id {} is out of range",
                frame_id
            )))
        );
        assert_eq!(replacer.size(), Ok(0));
    }

    #[rstest]
    fn test_interleaved_operations() {
        let mut replacer = LruReplacer::new(5);

        replacer.unpin(0).unwrap();
        replacer.unpin(1).unwrap();
        replacer.pin(0).unwrap();
        replacer.unpin(2).unwrap();
        replacer.unpin(0).unwrap();

        // LRU order is now 1, 2, 0.
        assert_eq!(replacer.victim(), Ok(Some(1)));

        replacer.unpin(3).unwrap();

        assert_eq!(replacer.victim(), Ok(Some(2)));
        assert_eq!(replacer.victim(), Ok(Some(0)));
        assert_eq!(replacer.victim(), Ok(Some(3)));
        assert_eq!(replacer.victim(), Ok(None));
    }
}
