//! LRU (Least Recently Used) recency ordering.
//!
//! A doubly linked list stored as an arena of links indexed by [`FrameId`],
//! with two extra slots acting as sentinel head and tail. The head end is the
//! most recently used frame; eviction scans from the tail.
//!
//! # Complexity
//! - Push / move to front / unlink: O(1)
//! - Eviction scan: O(n) worst case if every frame is skipped

use crate::common::FrameId;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
    linked: bool,
}

impl Link {
    const DETACHED: Link = Link {
        prev: usize::MAX,
        next: usize::MAX,
        linked: false,
    };
}

/// Recency list over a fixed set of frame slots.
#[derive(Debug)]
pub struct LruList {
    links: Vec<Link>,
    head: usize,
    tail: usize,
    len: usize,
}

impl LruList {
    /// Create an empty list for frames `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        let head = capacity;
        let tail = capacity + 1;
        let mut links = vec![Link::DETACHED; capacity + 2];
        links[head] = Link {
            prev: usize::MAX,
            next: tail,
            linked: true,
        };
        links[tail] = Link {
            prev: head,
            next: usize::MAX,
            linked: true,
        };
        Self {
            links,
            head,
            tail,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains(&self, frame_id: FrameId) -> bool {
        frame_id.0 < self.head && self.links[frame_id.0].linked
    }

    /// Insert a detached frame at the most recently used end.
    ///
    /// # Panics
    /// Panics if the frame is already linked or out of range.
    pub fn push_front(&mut self, frame_id: FrameId) {
        let idx = frame_id.0;
        assert!(idx < self.head, "{} out of range", frame_id);
        assert!(!self.links[idx].linked, "{} already linked", frame_id);

        let first = self.links[self.head].next;
        self.links[idx] = Link {
            prev: self.head,
            next: first,
            linked: true,
        };
        self.links[first].prev = idx;
        self.links[self.head].next = idx;
        self.len += 1;
    }

    /// Mark a frame as just used. Detached frames are inserted.
    pub fn move_to_front(&mut self, frame_id: FrameId) {
        if self.links[self.head].next == frame_id.0 {
            return;
        }
        self.unlink(frame_id);
        self.push_front(frame_id);
    }

    /// Detach a frame. Returns false if it was not linked.
    pub fn unlink(&mut self, frame_id: FrameId) -> bool {
        if !self.contains(frame_id) {
            return false;
        }
        let Link { prev, next, .. } = self.links[frame_id.0];
        self.links[prev].next = next;
        self.links[next].prev = prev;
        self.links[frame_id.0] = Link::DETACHED;
        self.len -= 1;
        true
    }

    /// Frames from most to least recently used.
    pub fn iter_mru(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.links[self.head].next,
            forward: true,
        }
    }

    /// Frames from least to most recently used (eviction order).
    pub fn iter_lru(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.links[self.tail].prev,
            forward: false,
        }
    }
}

/// Walks an [`LruList`] in one direction, stopping at a sentinel.
pub struct Iter<'a> {
    list: &'a LruList,
    cursor: usize,
    forward: bool,
}

impl Iterator for Iter<'_> {
    type Item = FrameId;

    fn next(&mut self) -> Option<FrameId> {
        if self.cursor == self.list.head || self.cursor == self.list.tail {
            return None;
        }
        let current = self.cursor;
        let link = self.list.links[current];
        self.cursor = if self.forward { link.next } else { link.prev };
        Some(FrameId::new(current))
    }
}
