use crate::dbms::types::FrameId;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferPoolReplacerError {
    /// Frame is out of range
    #[error("frame out of range: {0}")]
    FrameOutOfRange(String),
}

/// Victim-selection policy over the set of evictable frames.
///
/// A frame is evictable while it is resident in the pool but has no
/// outstanding pins. The buffer pool manager tells the replacer about pin
/// transitions; the replacer decides which evictable frame goes first.
pub trait IBufferPoolReplacer {
    /// Select a frame to evict from the buffer pool, returning the id of the
    /// removed frame. If no frame is evictable, return `None`.
    fn victim(&mut self) -> Result<Option<FrameId>, BufferPoolReplacerError>;
    /// Remove a frame from the eviction candidates, after it gets pinned or
    /// leaves the pool. A no-op if the frame is not tracked.
    fn pin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError>;
    /// Add a frame to the eviction candidates, after its pin count reaches
    /// zero. Idempotent: unpinning an already-tracked frame changes nothing.
    fn unpin(&mut self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError>;
    /// Return the number of frames currently tracked as evictable.
    fn size(&self) -> Result<usize, BufferPoolReplacerError>;
}
