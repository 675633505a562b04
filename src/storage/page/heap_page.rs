//! Slotted layout for heap pages holding fixed-width tuples.
//!
//! ```text
//! ┌────────────┬──────────────────┬────────┬────────┬─────┬────────┐
//! │ PageHeader │ occupancy bitmap │ slot 0 │ slot 1 │ ... │ slot N │
//! │  (7 bytes) │ ceil(N/8) bytes  │        │        │     │        │
//! └────────────┴──────────────────┴────────┴────────┴─────┴────────┘
//! ```
//!
//! Each slot costs `tuple_size` bytes plus one bitmap bit, so
//! `N = floor((page_size - header) * 8 / (tuple_size * 8 + 1))`, capped at
//! `u16::MAX` so the header's tuple count never overflows.

use super::page_header::{PageHeader, PageType};

/// Geometry of a heap page for one tuple width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapPageLayout {
    tuple_size: usize,
    slots: usize,
    bitmap_len: usize,
}

impl HeapPageLayout {
    /// # Panics
    /// Panics if `tuple_size` is 0.
    pub fn new(page_size: usize, tuple_size: usize) -> Self {
        assert!(tuple_size > 0, "tuple_size must be > 0");
        let usable_bits = page_size.saturating_sub(PageHeader::SIZE) * 8;
        // The header's tuple count is a u16.
        let slots = (usable_bits / (tuple_size * 8 + 1)).min(u16::MAX as usize);
        Self {
            tuple_size,
            slots,
            bitmap_len: slots.div_ceil(8),
        }
    }

    #[inline]
    pub fn slots_per_page(&self) -> usize {
        self.slots
    }

    #[inline]
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    fn slot_offset(&self, slot: usize) -> usize {
        PageHeader::SIZE + self.bitmap_len + slot * self.tuple_size
    }

    pub fn is_slot_used(&self, data: &[u8], slot: usize) -> bool {
        slot < self.slots && data[PageHeader::SIZE + slot / 8] & (1 << (slot % 8)) != 0
    }

    fn set_slot_used(&self, data: &mut [u8], slot: usize, used: bool) {
        let byte = &mut data[PageHeader::SIZE + slot / 8];
        if used {
            *byte |= 1 << (slot % 8);
        } else {
            *byte &= !(1 << (slot % 8));
        }
    }

    /// First empty slot, if any.
    pub fn free_slot(&self, data: &[u8]) -> Option<usize> {
        (0..self.slots).find(|&slot| !self.is_slot_used(data, slot))
    }

    /// Number of occupied slots, as recorded in the header.
    pub fn tuple_count(&self, data: &[u8]) -> usize {
        PageHeader::from_bytes(data).tuple_count as usize
    }

    /// Store `tuple` in the first free slot and return the slot number.
    ///
    /// # Panics
    /// Panics if `tuple` is not exactly `tuple_size` bytes.
    pub fn insert(&self, data: &mut [u8], tuple: &[u8]) -> Option<usize> {
        assert_eq!(tuple.len(), self.tuple_size, "tuple width mismatch");
        let slot = self.free_slot(data)?;

        let offset = self.slot_offset(slot);
        data[offset..offset + self.tuple_size].copy_from_slice(tuple);
        self.set_slot_used(data, slot, true);

        let mut header = PageHeader::from_bytes(data);
        header.page_type = PageType::Heap;
        header.tuple_count += 1;
        header.write_to(data);
        PageHeader::stamp_checksum(data);

        Some(slot)
    }

    /// Empty `slot`. Returns false if it was already empty.
    pub fn delete(&self, data: &mut [u8], slot: usize) -> bool {
        if !self.is_slot_used(data, slot) {
            return false;
        }

        let offset = self.slot_offset(slot);
        data[offset..offset + self.tuple_size].fill(0);
        self.set_slot_used(data, slot, false);

        let mut header = PageHeader::from_bytes(data);
        header.tuple_count -= 1;
        header.write_to(data);
        PageHeader::stamp_checksum(data);

        true
    }

    pub fn read_tuple<'a>(&self, data: &'a [u8], slot: usize) -> Option<&'a [u8]> {
        if !self.is_slot_used(data, slot) {
            return None;
        }
        let offset = self.slot_offset(slot);
        Some(&data[offset..offset + self.tuple_size])
    }

    /// Occupied slots in slot order.
    pub fn tuples<'a>(&'a self, data: &'a [u8]) -> impl Iterator<Item = (usize, &'a [u8])> + 'a {
        (0..self.slots).filter_map(move |slot| self.read_tuple(data, slot).map(|t| (slot, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count_fits_header_counter() {
        let layout = HeapPageLayout::new(1 << 20, 1);
        assert_eq!(layout.slots_per_page(), u16::MAX as usize);
        assert!(layout.slot_offset(layout.slots_per_page()) <= 1 << 20);
    }

    #[test]
    fn test_slot_count() {
        // (64 - 7) * 8 = 456 bits, 8-byte tuples cost 65 bits -> 7 slots.
        let layout = HeapPageLayout::new(64, 8);
        assert_eq!(layout.slots_per_page(), 7);

        let layout = HeapPageLayout::new(4096, 8);
        assert_eq!(layout.slots_per_page(), (4096 - 7) * 8 / 65);
    }

    #[test]
    fn test_insert_fills_page() {
        let layout = HeapPageLayout::new(64, 8);
        let mut data = vec![0u8; 64];

        for i in 0..7u8 {
            assert_eq!(layout.insert(&mut data, &[i; 8]), Some(i as usize));
        }
        assert_eq!(layout.insert(&mut data, &[9; 8]), None);
        assert_eq!(layout.tuple_count(&data), 7);
        assert_eq!(PageHeader::from_bytes(&data).page_type, PageType::Heap);
        assert!(PageHeader::verify(&data));
    }

    #[test]
    fn test_delete_frees_slot_for_reuse() {
        let layout = HeapPageLayout::new(64, 8);
        let mut data = vec![0u8; 64];

        layout.insert(&mut data, &[1; 8]);
        layout.insert(&mut data, &[2; 8]);
        assert!(layout.delete(&mut data, 0));
        assert!(!layout.delete(&mut data, 0));
        assert_eq!(layout.read_tuple(&data, 0), None);
        assert_eq!(layout.tuple_count(&data), 1);
        assert!(PageHeader::verify(&data));

        assert_eq!(layout.insert(&mut data, &[3; 8]), Some(0));
        assert_eq!(layout.read_tuple(&data, 0), Some(&[3u8; 8][..]));
    }

    #[test]
    fn test_tuples_in_slot_order() {
        let layout = HeapPageLayout::new(128, 4);
        let mut data = vec![0u8; 128];
        for i in 0..4u8 {
            layout.insert(&mut data, &[i; 4]);
        }
        layout.delete(&mut data, 1);

        let slots: Vec<usize> = layout.tuples(&data).map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![0, 2, 3]);
    }

    #[test]
    fn test_out_of_range_slot_is_unused() {
        let layout = HeapPageLayout::new(64, 8);
        let data = vec![0xFFu8; 64];
        assert!(!layout.is_slot_used(&data, 100));
    }
}
