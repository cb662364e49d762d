//! Table handle - heap-file record storage.
//!
//! A [`TableHandle`] maps fixed-size records onto the pages of one
//! file, through the buffer pool:
//!
//! - Page 0 holds the serialized [`TableHeader`]; data pages start at 1.
//! - Each data page is a slotted page: occupancy bitmap plus fixed
//!   slots, arranged by the table's [`StorageModel`].
//! - Pages with spare capacity form a singly-linked free-page list
//!   threaded through the page headers; the list head lives in the
//!   table header. A page is on the list iff it is not full.
//!
//! Operations take page-level latches through the buffer pool guards.
//! A multi-page sequence (free-list unlink, scan step) is not atomic
//! as a whole; concurrent structural mutation must be serialized by a
//! higher layer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::BufferPoolManager;
use crate::common::config::FILE_HEADER_PAGE_ID;
use crate::common::{Error, FileId, PageId, Result, Rid};

use super::page_handle::{PageHandle, ReadPageHandle};
use super::record::Record;
use super::slot_layout::{SlotLayout, StorageModel};
use super::table_header::TableHeader;

pub struct TableHandle {
    bpm: Arc<BufferPoolManager>,
    file_id: FileId,
    header: Mutex<TableHeader>,
    storage_model: StorageModel,
    layout: Box<dyn SlotLayout>,
}

impl TableHandle {
    /// Initialize a fresh table in an (empty) file.
    ///
    /// Writes the header page immediately so the file is recognizable
    /// on reopen.
    pub fn create(
        bpm: Arc<BufferPoolManager>,
        file_id: FileId,
        storage_model: StorageModel,
    ) -> Result<Self> {
        let header = TableHeader::new(storage_model.record_size(), storage_model.field_count());
        let table = Self {
            layout: storage_model.build_layout(),
            bpm,
            file_id,
            header: Mutex::new(header),
            storage_model,
        };
        table.write_header_page(&header)?;
        Ok(table)
    }

    /// Open an existing table, reading its header from page 0.
    pub fn open(
        bpm: Arc<BufferPoolManager>,
        file_id: FileId,
        storage_model: StorageModel,
    ) -> Result<Self> {
        let header = {
            let guard = bpm.fetch_page_read(file_id, FILE_HEADER_PAGE_ID)?;
            TableHeader::from_bytes(guard.slot_area())
        };
        assert_eq!(
            header.record_size as usize,
            storage_model.record_size(),
            "storage model does not match the on-disk header"
        );

        Ok(Self {
            layout: storage_model.build_layout(),
            bpm,
            file_id,
            header: Mutex::new(header),
            storage_model,
        })
    }

    // ========================================================================
    // Record CRUD
    // ========================================================================

    /// Insert a record into the first free slot of a page with spare
    /// capacity, allocating a new page when none has any.
    ///
    /// Returns the RID the record landed at.
    pub fn insert_record(&self, record: &Record) -> Result<Rid> {
        self.check_record_shape(record);
        let mut hdr = self.header.lock();

        let mut page = self.page_with_space(&mut hdr)?;
        let slot = page
            .first_free_slot()
            .ok_or(Error::PageFull(page.page_id()))?;

        page.write_slot(slot, record.nullmap(), record.data());
        page.set_occupied(slot, true);
        let count = page.record_count() + 1;
        page.set_record_count(count);
        hdr.record_count += 1;

        if count == hdr.records_per_page {
            hdr.first_free_page = page.next_free_page();
            page.set_next_free_page(PageId::INVALID);
        }

        Ok(Rid::new(page.page_id(), slot))
    }

    /// Insert at a caller-chosen RID; the recovery and index-rebuild
    /// path.
    ///
    /// # Errors
    /// - [`Error::PageMissing`] for the header page, an invalid id, or
    ///   a page past the end of the file
    /// - [`Error::RecordMissing`] for a slot beyond the page's capacity
    /// - [`Error::RecordExists`] when the slot is occupied
    pub fn insert_record_at(&self, rid: Rid, record: &Record) -> Result<()> {
        self.check_record_shape(record);
        let mut hdr = self.header.lock();

        if !rid.page_id.is_valid()
            || rid.page_id == FILE_HEADER_PAGE_ID
            || rid.page_id.0 >= hdr.page_count
        {
            return Err(Error::PageMissing(rid.page_id));
        }
        if rid.slot >= hdr.records_per_page {
            // A stale or corrupt RID is caller data, not a crash.
            return Err(Error::RecordMissing(rid));
        }

        let mut page = self.fetch_write(rid.page_id, &hdr)?;
        if page.is_occupied(rid.slot) {
            return Err(Error::RecordExists(rid));
        }

        page.write_slot(rid.slot, record.nullmap(), record.data());
        page.set_occupied(rid.slot, true);
        let count = page.record_count() + 1;
        page.set_record_count(count);
        hdr.record_count += 1;

        if count == hdr.records_per_page {
            self.unlink_from_free_list(&mut hdr, &mut page)?;
        }

        Ok(())
    }

    /// # Errors
    /// - [`Error::RecordMissing`] when the slot is empty
    pub fn get_record(&self, rid: Rid) -> Result<Record> {
        let hdr = *self.header.lock();
        self.check_rid(&hdr, rid)?;
        let page = self.fetch_read(rid.page_id, &hdr)?;

        if !page.is_occupied(rid.slot) {
            return Err(Error::RecordMissing(rid));
        }
        let (nullmap, data) = page.read_slot(rid.slot);
        Ok(Record::with_rid(nullmap, data, rid))
    }

    /// Delete the record at `rid`.
    ///
    /// A page that was exactly full goes back onto the free-list head;
    /// a page already on the list stays where it is.
    ///
    /// # Errors
    /// - [`Error::RecordMissing`] when the slot is already empty
    pub fn delete_record(&self, rid: Rid) -> Result<()> {
        let mut hdr = self.header.lock();
        self.check_rid(&hdr, rid)?;
        let mut page = self.fetch_write(rid.page_id, &hdr)?;

        if !page.is_occupied(rid.slot) {
            return Err(Error::RecordMissing(rid));
        }

        let was_full = page.record_count() == hdr.records_per_page;

        page.set_occupied(rid.slot, false);
        page.set_record_count(page.record_count() - 1);
        hdr.record_count -= 1;

        if was_full {
            page.set_next_free_page(hdr.first_free_page);
            hdr.first_free_page = page.page_id();
        }

        Ok(())
    }

    /// Overwrite the record at `rid` in place; the RID never changes.
    ///
    /// # Errors
    /// - [`Error::RecordMissing`] when the slot is empty
    pub fn update_record(&self, rid: Rid, record: &Record) -> Result<()> {
        self.check_record_shape(record);
        let hdr = *self.header.lock();
        self.check_rid(&hdr, rid)?;
        let mut page = self.fetch_write(rid.page_id, &hdr)?;

        if !page.is_occupied(rid.slot) {
            return Err(Error::RecordMissing(rid));
        }
        page.write_slot(rid.slot, record.nullmap(), record.data());
        Ok(())
    }

    // ========================================================================
    // Scan
    // ========================================================================

    /// RID of the first live record in physical order, or
    /// [`Rid::INVALID`] for an empty table.
    pub fn first_rid(&self) -> Result<Rid> {
        let hdr = *self.header.lock();
        self.scan_from(&hdr, FILE_HEADER_PAGE_ID.0 + 1, 0)
    }

    /// RID of the next live record after `rid` in physical order, or
    /// [`Rid::INVALID`] at end of file.
    pub fn next_rid(&self, rid: Rid) -> Result<Rid> {
        if !rid.is_valid() {
            return Ok(Rid::INVALID);
        }
        let hdr = *self.header.lock();
        self.scan_from(&hdr, rid.page_id.0, rid.slot + 1)
    }

    /// Iterate live records in scan order.
    ///
    /// Point-in-time with no isolation guarantee: records inserted or
    /// deleted mid-scan may or may not be observed.
    pub fn iter(&self) -> TableIter<'_> {
        TableIter {
            table: self,
            state: IterState::Start,
        }
    }

    fn scan_from(&self, hdr: &TableHeader, mut page_id: u32, mut slot: u32) -> Result<Rid> {
        while page_id < hdr.page_count {
            let page = self.fetch_read(PageId(page_id), hdr)?;
            if let Some(found) = page.first_live_slot(slot) {
                return Ok(Rid::new(PageId(page_id), found));
            }
            page_id += 1;
            slot = 0;
        }
        Ok(Rid::INVALID)
    }

    // ========================================================================
    // Introspection & persistence
    // ========================================================================

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// Snapshot of the table header.
    pub fn header(&self) -> TableHeader {
        *self.header.lock()
    }

    pub fn record_count(&self) -> u64 {
        self.header.lock().record_count
    }

    pub fn storage_model(&self) -> &StorageModel {
        &self.storage_model
    }

    /// The table's name, derived from its file path.
    pub fn table_name(&self) -> Result<String> {
        let file_name = self.bpm.file_name(self.file_id)?;
        let name = std::path::Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name);
        Ok(name)
    }

    /// Persist the header page and every resident data page.
    pub fn flush(&self) -> Result<()> {
        let hdr = *self.header.lock();
        self.write_header_page(&hdr)?;
        self.bpm.flush_all_pages(self.file_id)
    }

    // ========================================================================
    // Free-page-list maintenance
    // ========================================================================

    /// A write handle on a page with at least one empty slot: the
    /// free-list head when one exists, else a fresh page appended to
    /// the file and pushed onto the list.
    fn page_with_space(&self, hdr: &mut TableHeader) -> Result<PageHandle<'_>> {
        if hdr.first_free_page.is_valid() {
            return self.fetch_write(hdr.first_free_page, hdr);
        }

        // Fetch before touching the header: a failed fetch must not
        // leave a phantom page recorded in `page_count`.
        let page_id = PageId(hdr.page_count);
        let mut page = self.fetch_write(page_id, hdr)?;
        hdr.page_count += 1;

        // The disk layer serves unwritten pages zeroed, but a zeroed
        // free-list link decodes as page 0; initialize explicitly.
        page.reset();
        page.set_next_free_page(hdr.first_free_page);
        hdr.first_free_page = page_id;
        Ok(page)
    }

    /// Unlink a just-filled page from wherever it sits in the free
    /// list: head advance, or a predecessor walk down the chain.
    fn unlink_from_free_list(&self, hdr: &mut TableHeader, page: &mut PageHandle<'_>) -> Result<()> {
        let page_id = page.page_id();

        if hdr.first_free_page == page_id {
            hdr.first_free_page = page.next_free_page();
        } else {
            let mut cur = hdr.first_free_page;
            while cur.is_valid() {
                let mut prev = self.fetch_write(cur, hdr)?;
                let next = prev.next_free_page();
                if next == page_id {
                    prev.set_next_free_page(page.next_free_page());
                    break;
                }
                cur = next;
            }
            debug_assert!(cur.is_valid(), "filled page was not on the free list");
        }

        page.set_next_free_page(PageId::INVALID);
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn fetch_read(&self, page_id: PageId, hdr: &TableHeader) -> Result<ReadPageHandle<'_>> {
        let guard = self.bpm.fetch_page_read(self.file_id, page_id)?;
        Ok(ReadPageHandle::new(guard, *hdr, self.layout.as_ref()))
    }

    fn fetch_write(&self, page_id: PageId, hdr: &TableHeader) -> Result<PageHandle<'_>> {
        let guard = self.bpm.fetch_page_write(self.file_id, page_id)?;
        Ok(PageHandle::new(guard, *hdr, self.layout.as_ref()))
    }

    fn write_header_page(&self, hdr: &TableHeader) -> Result<()> {
        let mut guard = self.bpm.fetch_page_write(self.file_id, FILE_HEADER_PAGE_ID)?;
        hdr.write_to(guard.slot_area_mut());
        Ok(())
    }

    /// A RID outside the table's data pages or slot range can never
    /// name a live record; reject it without touching the pool, so a
    /// bad RID does not materialize phantom pages.
    fn check_rid(&self, hdr: &TableHeader, rid: Rid) -> Result<()> {
        if !rid.page_id.is_valid()
            || rid.page_id == FILE_HEADER_PAGE_ID
            || rid.page_id.0 >= hdr.page_count
            || rid.slot >= hdr.records_per_page
        {
            return Err(Error::RecordMissing(rid));
        }
        Ok(())
    }

    fn check_record_shape(&self, record: &Record) {
        let hdr = self.header.lock();
        assert_eq!(
            record.data().len(),
            hdr.record_size as usize,
            "record payload size mismatch"
        );
        assert_eq!(
            record.nullmap().len(),
            hdr.nullmap_size as usize,
            "record nullmap size mismatch"
        );
    }
}

#[derive(Clone, Copy)]
enum IterState {
    Start,
    At(Rid),
    Done,
}

/// Forward scan over a table's live records.
pub struct TableIter<'a> {
    table: &'a TableHandle,
    state: IterState,
}

impl Iterator for TableIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.state {
            IterState::Start => self.table.first_rid(),
            IterState::At(rid) => self.table.next_rid(rid),
            IterState::Done => return None,
        };

        let rid = match step {
            Ok(rid) => rid,
            Err(e) => {
                self.state = IterState::Done;
                return Some(Err(e));
            }
        };

        if !rid.is_valid() {
            self.state = IterState::Done;
            return None;
        }
        self.state = IterState::At(rid);
        Some(self.table.get_record(rid))
    }
}
