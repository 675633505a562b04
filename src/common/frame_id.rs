//! Frame identifier type.

use std::fmt;

/// Identifies a slot in the buffer pool's frame arena.
///
/// Using `usize` because:
/// 1. Frames are stored in `Vec<Option<Frame>>`
/// 2. The recency list is an arena of links indexed the same way
/// 3. Direct indexing without casting: `frames[frame_id.0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
