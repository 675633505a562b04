//! Page header and type definitions.
//!
//! Every heap page starts with a [`PageHeader`] containing metadata:
//! - [`PageType`] discriminator
//! - CRC32 checksum for integrity
//! - Number of occupied tuple slots

/// Type of page stored on disk.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Never written (a freshly appended, all-zero page).
    #[default]
    Invalid = 0,
    /// Slotted heap page holding fixed-width tuples.
    Heap = 1,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Heap,
            _ => PageType::Invalid,
        }
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (7 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       2     tuple_count (little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself set to zero. Heap page mutations re-stamp it, and the table file
/// verifies it when the page is read back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
    pub tuple_count: u16,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 7;

    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_TUPLE_COUNT: usize = 5;

    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            checksum: 0,
            tuple_count: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let page_type = PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]);

        let checksum = u32::from_le_bytes([
            data[Self::OFFSET_CHECKSUM],
            data[Self::OFFSET_CHECKSUM + 1],
            data[Self::OFFSET_CHECKSUM + 2],
            data[Self::OFFSET_CHECKSUM + 3],
        ]);

        let tuple_count = u16::from_le_bytes([
            data[Self::OFFSET_TUPLE_COUNT],
            data[Self::OFFSET_TUPLE_COUNT + 1],
        ]);

        Self {
            page_type,
            checksum,
            tuple_count,
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
        data[Self::OFFSET_TUPLE_COUNT..Self::OFFSET_TUPLE_COUNT + 2]
            .copy_from_slice(&self.tuple_count.to_le_bytes());
    }

    /// Compute CRC32 checksum of a page.
    ///
    /// The checksum field (bytes 1-4) is fed as zeros so the checksum
    /// doesn't include itself.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Compute the checksum of `page_data` and store it in its header.
    pub fn stamp_checksum(page_data: &mut [u8]) {
        let checksum = Self::compute_checksum(page_data);
        page_data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Check a page read from disk.
    ///
    /// Only heap pages carry a checksum; untyped pages are accepted as-is.
    pub fn verify(page_data: &[u8]) -> bool {
        let header = Self::from_bytes(page_data);
        match header.page_type {
            PageType::Invalid => true,
            PageType::Heap => header.checksum == Self::compute_checksum(page_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_from_u8() {
        assert_eq!(PageType::from_u8(0), PageType::Invalid);
        assert_eq!(PageType::from_u8(1), PageType::Heap);
        assert_eq!(PageType::from_u8(255), PageType::Invalid);
    }

    #[test]
    fn test_page_header_byte_layout() {
        let header = PageHeader {
            page_type: PageType::Heap,
            checksum: 0x04030201,
            tuple_count: 0x0201,
        };

        let mut buffer = [0u8; PageHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer, [1, 0x01, 0x02, 0x03, 0x04, 0x01, 0x02]);
        assert_eq!(PageHeader::from_bytes(&buffer), header);
    }

    #[test]
    fn test_checksum_ignores_checksum_field() {
        let mut page_data = [0u8; 256];
        page_data[100] = 0xAB;

        let checksum1 = PageHeader::compute_checksum(&page_data);
        page_data[1..5].copy_from_slice(&[0xFF; 4]);
        let checksum2 = PageHeader::compute_checksum(&page_data);

        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_stamp_and_verify() {
        let mut page_data = vec![0u8; 256];
        PageHeader::new(PageType::Heap).write_to(&mut page_data);
        page_data[100] = 0xAB;
        PageHeader::stamp_checksum(&mut page_data);
        assert!(PageHeader::verify(&page_data));

        // Corrupt the page
        page_data[100] = 0xFF;
        assert!(!PageHeader::verify(&page_data));
    }

    #[test]
    fn test_untyped_page_verifies() {
        assert!(PageHeader::verify(&[0u8; 128]));

        let mut raw = [0u8; 128];
        raw[64] = 1;
        assert!(PageHeader::verify(&raw));
    }
}
