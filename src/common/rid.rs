//! Record identifier.

use std::fmt;

use crate::common::PageId;

/// The stable external identity of a stored record: `(page_id, slot)`.
///
/// A record keeps its RID for its whole lifetime; updates overwrite the
/// slot in place and never relocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rid {
    pub page_id: PageId,
    pub slot: u32,
}

impl Rid {
    /// Sentinel for "no record" / end-of-scan.
    pub const INVALID: Rid = Rid {
        page_id: PageId::INVALID,
        slot: u32::MAX,
    };

    #[inline]
    pub fn new(page_id: PageId, slot: u32) -> Self {
        Self { page_id, slot }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Rid({}, {})", self.page_id.0, self.slot)
        } else {
            write!(f, "Rid(INVALID)")
        }
    }
}
