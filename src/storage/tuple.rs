//! Tuples and record ids.

use std::fmt;

use crate::common::PageId;

/// Where a stored tuple lives: a page and a slot on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: usize) -> Self {
        Self { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot)
    }
}

/// A fixed-width row payload.
///
/// The storage layer treats the bytes as opaque; a table's file only checks
/// that the width matches its tuple size. The record id is filled in once
/// the tuple is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    data: Vec<u8>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            record_id: None,
        }
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }

    pub fn with_record_id(mut self, record_id: RecordId) -> Self {
        self.record_id = Some(record_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TableId;

    #[test]
    fn test_record_id_display() {
        let rid = RecordId::new(PageId::new(TableId(2), 5), 3);
        assert_eq!(format!("{}", rid), "Page(t2:5)#3");
    }

    #[test]
    fn test_tuple_record_id() {
        let mut tuple = Tuple::new(vec![1, 2, 3]);
        assert_eq!(tuple.record_id(), None);
        assert_eq!(tuple.data(), &[1, 2, 3]);

        let rid = RecordId::new(PageId::new(TableId(1), 0), 0);
        tuple.set_record_id(Some(rid));
        assert_eq!(tuple.record_id(), Some(rid));
    }
}
