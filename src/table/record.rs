//! Record - a fixed-size tuple with per-field null tracking.

use crate::common::Rid;

use super::bitmap;

/// One table record: a null bitmap (one bit per field, set = NULL) and
/// the fixed-width payload bytes.
///
/// A record fetched from a table carries the RID it was read at;
/// records built by callers for insertion carry [`Rid::INVALID`] until
/// the table assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    nullmap: Vec<u8>,
    data: Vec<u8>,
    rid: Rid,
}

impl Record {
    pub fn new(nullmap: Vec<u8>, data: Vec<u8>) -> Self {
        Self {
            nullmap,
            data,
            rid: Rid::INVALID,
        }
    }

    pub(crate) fn with_rid(nullmap: Vec<u8>, data: Vec<u8>, rid: Rid) -> Self {
        Self { nullmap, data, rid }
    }

    /// A record with no NULL fields.
    pub fn non_null(nullmap_size: usize, data: Vec<u8>) -> Self {
        Self::new(vec![0u8; nullmap_size], data)
    }

    #[inline]
    pub fn nullmap(&self) -> &[u8] {
        &self.nullmap
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    /// Whether field `idx` is NULL.
    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        bitmap::get_bit(&self.nullmap, idx)
    }

    /// Mark field `idx` NULL or not.
    pub fn set_null(&mut self, idx: usize, null: bool) {
        bitmap::set_bit(&mut self.nullmap, idx, null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;

    #[test]
    fn test_new_record_has_invalid_rid() {
        let rec = Record::new(vec![0], vec![1, 2, 3]);
        assert!(!rec.rid().is_valid());
        assert_eq!(rec.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_null_flags() {
        let mut rec = Record::non_null(1, vec![0; 8]);
        assert!(!rec.is_null(0));

        rec.set_null(2, true);
        assert!(rec.is_null(2));
        assert!(!rec.is_null(1));

        rec.set_null(2, false);
        assert!(!rec.is_null(2));
    }

    #[test]
    fn test_with_rid() {
        let rid = Rid::new(PageId::new(1), 4);
        let rec = Record::with_rid(vec![0], vec![9], rid);
        assert_eq!(rec.rid(), rid);
    }
}
