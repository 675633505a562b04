//! Table and page identifier types.

use std::fmt;

/// Identifies a table (and therefore its backing file) in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a page anywhere in the engine.
///
/// A page id is the pair (table, page number within that table). Page
/// `page_no` of a table lives at byte offset `page_no × page_size` of the
/// table's file.
///
/// # Example
/// ```
/// use lockstepdb::{PageId, TableId};
///
/// let pid = PageId::new(TableId(1), 42);
/// assert_eq!(pid.table_id(), TableId(1));
/// assert_eq!(pid.page_no(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    table_id: TableId,
    page_no: u32,
}

impl PageId {
    #[inline]
    pub fn new(table_id: TableId, page_no: u32) -> Self {
        Self { table_id, page_no }
    }

    #[inline]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    #[inline]
    pub fn page_no(&self) -> u32 {
        self.page_no
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page(t{}:{})", self.table_id, self.page_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_page_id_equality_by_value() {
        let a = PageId::new(TableId(1), 7);
        let b = PageId::new(TableId(1), 7);
        let c = PageId::new(TableId(2), 7);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<PageId> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_page_id_ordering() {
        assert!(PageId::new(TableId(1), 1) < PageId::new(TableId(1), 2));
        assert!(PageId::new(TableId(1), 9) < PageId::new(TableId(2), 0));
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(TableId(4), 42)), "Page(t4:42)");
    }
}
