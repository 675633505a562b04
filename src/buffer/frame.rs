//! Frame - one occupied slot in the buffer pool.
//!
//! A [`Frame`] pairs a page id with the shared [`PageRef`] handed out to
//! callers. Its position in the recency order lives in the pool's
//! [`LruList`](super::replacer::LruList) under the same [`FrameId`].
//!
//! [`FrameId`]: crate::common::FrameId

use std::sync::Arc;

use crate::common::{PageId, TransactionId};
use crate::storage::page::PageRef;

#[derive(Debug)]
pub struct Frame {
    page_id: PageId,
    page: PageRef,
}

impl Frame {
    pub fn new(page: PageRef) -> Self {
        Self {
            page_id: page.id(),
            page,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn page(&self) -> &PageRef {
        &self.page
    }

    /// Point the frame at a newer version of its page.
    ///
    /// Returns false (and changes nothing) when `page` already is the cached
    /// handle.
    pub fn replace_page(&mut self, page: PageRef) -> bool {
        debug_assert_eq!(page.id(), self.page_id);
        if Arc::ptr_eq(&self.page, &page) {
            return false;
        }
        self.page = page;
        true
    }

    #[inline]
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.page.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TableId;
    use crate::storage::page::Page;

    fn page() -> PageRef {
        Arc::new(Page::new(PageId::new(TableId(1), 3), 64))
    }

    #[test]
    fn test_frame_tracks_page() {
        let page = page();
        let frame = Frame::new(Arc::clone(&page));
        assert_eq!(frame.page_id(), PageId::new(TableId(1), 3));
        assert!(Arc::ptr_eq(frame.page(), &page));
        assert_eq!(frame.dirtied_by(), None);

        let tid = TransactionId::new();
        page.mark_dirty(Some(tid));
        assert_eq!(frame.dirtied_by(), Some(tid));
    }

    #[test]
    fn test_replace_page() {
        let original = page();
        let mut frame = Frame::new(Arc::clone(&original));

        assert!(!frame.replace_page(Arc::clone(&original)));

        let newer = page();
        assert!(frame.replace_page(Arc::clone(&newer)));
        assert!(Arc::ptr_eq(frame.page(), &newer));
    }
}
