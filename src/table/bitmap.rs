//! Occupancy-bitmap helpers.
//!
//! A slotted page tracks live slots with one bit per slot, LSB-first
//! within each byte: bit `i` lives in byte `i / 8` at position `i % 8`.

/// Bytes needed to hold `bits` bits.
#[inline]
pub const fn size_for(bits: usize) -> usize {
    bits.div_ceil(8)
}

#[inline]
pub fn get_bit(bitmap: &[u8], idx: usize) -> bool {
    bitmap[idx / 8] & (1 << (idx % 8)) != 0
}

#[inline]
pub fn set_bit(bitmap: &mut [u8], idx: usize, value: bool) {
    if value {
        bitmap[idx / 8] |= 1 << (idx % 8);
    } else {
        bitmap[idx / 8] &= !(1 << (idx % 8));
    }
}

/// First index in `[from, len)` whose bit equals `value`, or `None`.
pub fn find_first(bitmap: &[u8], len: usize, from: usize, value: bool) -> Option<usize> {
    (from..len).find(|&i| get_bit(bitmap, i) == value)
}

/// Number of set bits among the first `len`.
pub fn count_ones(bitmap: &[u8], len: usize) -> usize {
    (0..len).filter(|&i| get_bit(bitmap, i)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_size_for() {
        assert_eq!(size_for(0), 0);
        assert_eq!(size_for(1), 1);
        assert_eq!(size_for(8), 1);
        assert_eq!(size_for(9), 2);
        assert_eq!(size_for(64), 8);
    }

    #[test]
    fn test_set_and_get() {
        let mut bm = [0u8; 4];

        set_bit(&mut bm, 0, true);
        set_bit(&mut bm, 9, true);
        set_bit(&mut bm, 31, true);

        assert!(get_bit(&bm, 0));
        assert!(!get_bit(&bm, 1));
        assert!(get_bit(&bm, 9));
        assert!(get_bit(&bm, 31));

        set_bit(&mut bm, 9, false);
        assert!(!get_bit(&bm, 9));
    }

    #[test]
    fn test_find_first() {
        let mut bm = [0u8; 2];
        set_bit(&mut bm, 3, true);
        set_bit(&mut bm, 7, true);

        assert_eq!(find_first(&bm, 16, 0, true), Some(3));
        assert_eq!(find_first(&bm, 16, 4, true), Some(7));
        assert_eq!(find_first(&bm, 16, 8, true), None);
        assert_eq!(find_first(&bm, 16, 0, false), Some(0));
        assert_eq!(find_first(&bm, 16, 3, false), Some(4));

        // Search window is clamped to len.
        assert_eq!(find_first(&bm, 3, 0, true), None);
    }

    #[test]
    fn test_count_ones() {
        let mut bm = [0u8; 2];
        assert_eq!(count_ones(&bm, 16), 0);

        for i in [0, 5, 12] {
            set_bit(&mut bm, i, true);
        }
        assert_eq!(count_ones(&bm, 16), 3);
        // Counting a prefix ignores later bits.
        assert_eq!(count_ones(&bm, 6), 2);
    }

    proptest! {
        #[test]
        fn prop_set_then_get(indices in prop::collection::hash_set(0usize..128, 0..32)) {
            let mut bm = [0u8; 16];
            for &i in &indices {
                set_bit(&mut bm, i, true);
            }
            for i in 0..128 {
                prop_assert_eq!(get_bit(&bm, i), indices.contains(&i));
            }
            prop_assert_eq!(count_ones(&bm, 128), indices.len());
        }

        #[test]
        fn prop_find_first_is_minimal(indices in prop::collection::hash_set(0usize..64, 1..16)) {
            let mut bm = [0u8; 8];
            for &i in &indices {
                set_bit(&mut bm, i, true);
            }
            let expected = indices.iter().copied().min();
            prop_assert_eq!(find_first(&bm, 64, 0, true), expected);
        }
    }
}
