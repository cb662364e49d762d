//! Storage-model slot layouts.
//!
//! A data page's slot area starts with the occupancy bitmap; how the
//! record bytes behind it are arranged is the storage model's choice:
//!
//! - [`NaryLayout`] (row-major): each slot is a contiguous
//!   `[nullmap][payload]` run, best for whole-record access.
//! - [`PaxLayout`] (column-major): nullmaps and each field form
//!   per-page columns, best for scans touching few fields.
//!
//! Both models pack the same bytes per record, so page capacity is
//! layout-independent.

use crate::storage::page::Page;

use super::table_header::TableHeader;

/// How a table's pages lay out their slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageModel {
    /// Row-major slots.
    Nary {
        record_size: usize,
        field_count: usize,
    },
    /// Column-major slots over fixed field widths.
    Pax { field_sizes: Vec<usize> },
}

impl StorageModel {
    pub fn record_size(&self) -> usize {
        match self {
            StorageModel::Nary { record_size, .. } => *record_size,
            StorageModel::Pax { field_sizes } => field_sizes.iter().sum(),
        }
    }

    pub fn field_count(&self) -> usize {
        match self {
            StorageModel::Nary { field_count, .. } => *field_count,
            StorageModel::Pax { field_sizes } => field_sizes.len(),
        }
    }

    pub(crate) fn build_layout(&self) -> Box<dyn SlotLayout> {
        match self {
            StorageModel::Nary { .. } => Box::new(NaryLayout),
            StorageModel::Pax { field_sizes } => Box::new(PaxLayout {
                field_sizes: field_sizes.clone(),
            }),
        }
    }
}

/// Maps `(slot, nullmap, payload)` onto slot-area bytes.
///
/// The occupancy bitmap at the start of the slot area is outside the
/// layout's jurisdiction; offsets here are relative to the slot area
/// and start after it.
pub trait SlotLayout: Send + Sync {
    fn read_slot(
        &self,
        page: &Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &mut [u8],
        data: &mut [u8],
    );

    fn write_slot(
        &self,
        page: &mut Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &[u8],
        data: &[u8],
    );
}

/// Row-major: slot `i` at `bitmap_size + i * slot_size`, holding the
/// record's nullmap then its payload.
pub struct NaryLayout;

impl NaryLayout {
    fn slot_offset(header: &TableHeader, slot: u32) -> usize {
        header.bitmap_size() + slot as usize * header.slot_size()
    }
}

impl SlotLayout for NaryLayout {
    fn read_slot(
        &self,
        page: &Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &mut [u8],
        data: &mut [u8],
    ) {
        let off = Self::slot_offset(header, slot);
        let nm = header.nullmap_size as usize;
        let area = page.slot_area();

        nullmap.copy_from_slice(&area[off..off + nm]);
        data.copy_from_slice(&area[off + nm..off + nm + header.record_size as usize]);
    }

    fn write_slot(
        &self,
        page: &mut Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &[u8],
        data: &[u8],
    ) {
        let off = Self::slot_offset(header, slot);
        let nm = header.nullmap_size as usize;
        let area = page.slot_area_mut();

        area[off..off + nm].copy_from_slice(nullmap);
        area[off + nm..off + nm + data.len()].copy_from_slice(data);
    }
}

/// Column-major: after the bitmap come the nullmaps of every slot, then
/// one column per field.
///
/// ```text
/// [bitmap][nullmap × rpp][field0 × rpp][field1 × rpp]...
/// ```
pub struct PaxLayout {
    field_sizes: Vec<usize>,
}

impl PaxLayout {
    /// Slot-area offset of field `field`'s column.
    fn column_offset(&self, header: &TableHeader, field: usize) -> usize {
        let rpp = header.records_per_page as usize;
        let prefix: usize = self.field_sizes[..field].iter().sum();
        header.bitmap_size() + rpp * header.nullmap_size as usize + rpp * prefix
    }

    fn nullmap_offset(header: &TableHeader, slot: u32) -> usize {
        header.bitmap_size() + slot as usize * header.nullmap_size as usize
    }
}

impl SlotLayout for PaxLayout {
    fn read_slot(
        &self,
        page: &Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &mut [u8],
        data: &mut [u8],
    ) {
        let area = page.slot_area();
        let nm = header.nullmap_size as usize;
        let nm_off = Self::nullmap_offset(header, slot);
        nullmap.copy_from_slice(&area[nm_off..nm_off + nm]);

        let mut rec_off = 0;
        for (field, &size) in self.field_sizes.iter().enumerate() {
            let col = self.column_offset(header, field) + slot as usize * size;
            data[rec_off..rec_off + size].copy_from_slice(&area[col..col + size]);
            rec_off += size;
        }
    }

    fn write_slot(
        &self,
        page: &mut Page,
        header: &TableHeader,
        slot: u32,
        nullmap: &[u8],
        data: &[u8],
    ) {
        let nm_off = Self::nullmap_offset(header, slot);
        let area = page.slot_area_mut();
        area[nm_off..nm_off + nullmap.len()].copy_from_slice(nullmap);

        let mut rec_off = 0;
        for (field, &size) in self.field_sizes.iter().enumerate() {
            let col = self.column_offset(header, field) + slot as usize * size;
            area[col..col + size].copy_from_slice(&data[rec_off..rec_off + size]);
            rec_off += size;
        }
    }
}
