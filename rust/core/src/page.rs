// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Paged bump allocation.
//!
//! A [`PageList`] is a sequence of fixed-capacity pages. Elements are only
//! ever appended to the last page; when it is full a new page is allocated
//! and becomes the writable frontier. Pages never reallocate, so a
//! [`SlotId`] or [`Span`] handed out once stays valid until the list is
//! cleared. Nothing is freed individually.
//!
//! Page indices are absolute: clearing a list retires its indices, so a
//! stale id resolves to `None` instead of aliasing a newer page.

use crate::error::{Error, PageKind, Result};

/// Address of one element: page index and slot within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    page: u32,
    slot: u32,
}

impl SlotId {
    pub const fn new(page: u32, slot: u32) -> Self {
        Self { page, slot }
    }

    pub const fn page(self) -> u32 {
        self.page
    }

    pub const fn slot(self) -> u32 {
        self.slot
    }
}

/// Contiguous run of elements inside a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    page: u32,
    start: u32,
    len: u32,
}

impl Span {
    pub const fn len(self) -> usize {
        self.len as usize
    }

    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    pub const fn page(self) -> u32 {
        self.page
    }
}

/// Page counts of the four allocators of a collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageStats {
    pub character_pages: usize,
    pub record_pages: usize,
    pub argument_pages: usize,
    pub error_pages: usize,
}

#[derive(Debug)]
struct Page<T> {
    slots: Vec<T>,
    limit: usize,
}

impl<T> Page<T> {
    #[inline]
    fn room(&self) -> usize {
        self.limit - self.slots.len()
    }
}

/// Append-only list of fixed-capacity pages.
#[derive(Debug)]
pub struct PageList<T> {
    kind: PageKind,
    capacity: usize,
    pages: Vec<Page<T>>,
    len: usize,
    /// Pages released by earlier `clear` calls.
    retired: u32,
}

impl<T> PageList<T> {
    /// Create an empty list. The first page is allocated on first use.
    pub fn new(kind: PageKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity: capacity.max(1),
            pages: Vec::new(),
            len: 0,
            retired: 0,
        }
    }

    /// Slots per regular page.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of elements across all pages.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one element, opening a new page if the frontier is full.
    pub fn push(&mut self, value: T) -> Result<SlotId> {
        let page_index = self.frontier(1)?;
        let page = &mut self.pages[page_index];
        let slot = page.slots.len();
        page.slots.push(value);
        self.len += 1;
        Ok(SlotId::new(self.absolute(page_index), slot as u32))
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.page(id.page)
            .and_then(|page| page.slots.get(id.slot as usize))
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        let local = id.page.checked_sub(self.retired)? as usize;
        self.pages
            .get_mut(local)
            .and_then(|page| page.slots.get_mut(id.slot as usize))
    }

    /// Elements in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.slots.iter())
    }

    /// Most recently appended element.
    pub fn last(&self) -> Option<&T> {
        self.pages.iter().rev().find_map(|page| page.slots.last())
    }

    /// Drop every page at once.
    pub fn clear(&mut self) {
        if !self.pages.is_empty() {
            tracing::debug!(kind = %self.kind, pages = self.pages.len(), "released pages");
        }
        self.retired += self.pages.len() as u32;
        self.pages = Vec::new();
        self.len = 0;
    }

    #[inline]
    fn absolute(&self, local: usize) -> u32 {
        self.retired + local as u32
    }

    #[inline]
    fn page(&self, absolute: u32) -> Option<&Page<T>> {
        let local = absolute.checked_sub(self.retired)?;
        self.pages.get(local as usize)
    }

    /// Index of a page with at least `needed` free slots, allocating one if
    /// the frontier is too full. Oversized requests get a page of their own
    /// size.
    fn frontier(&mut self, needed: usize) -> Result<usize> {
        match self.pages.last() {
            Some(page) if page.room() >= needed => Ok(self.pages.len() - 1),
            _ => self.grow(needed),
        }
    }

    fn grow(&mut self, needed: usize) -> Result<usize> {
        let requested = self.capacity.max(needed);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(requested)
            .map_err(|_| Error::allocation(self.kind, requested))?;
        self.pages
            .try_reserve(1)
            .map_err(|_| Error::allocation(self.kind, requested))?;
        self.pages.push(Page {
            slots,
            limit: requested,
        });
        tracing::debug!(
            kind = %self.kind,
            pages = self.pages.len(),
            slots = requested,
            "allocated page"
        );
        Ok(self.pages.len() - 1)
    }
}

impl<T: Copy> PageList<T> {
    /// Copy `values` into one contiguous run.
    pub fn push_slice(&mut self, values: &[T]) -> Result<Span> {
        let page_index = self.frontier(values.len())?;
        let page = &mut self.pages[page_index];
        let start = page.slots.len();
        page.slots.extend_from_slice(values);
        self.len += values.len();
        Ok(Span {
            page: self.absolute(page_index),
            start: start as u32,
            len: values.len() as u32,
        })
    }

    /// Copy an existing run followed by `tail` into one new contiguous run.
    pub fn push_concat(&mut self, head: Span, tail: &[T]) -> Result<Span> {
        let head_len = self.slice(head).map_or(0, <[T]>::len);
        let total = head_len + tail.len();
        let page_index = self.frontier(total)?;
        let start = self.pages[page_index].slots.len();

        if head_len > 0 {
            let source = (head.page - self.retired) as usize;
            let range = head.start as usize..head.start as usize + head_len;
            if source == page_index {
                self.pages[page_index].slots.extend_from_within(range);
            } else {
                // The frontier is always the last page.
                let (before, frontier) = self.pages.split_at_mut(page_index);
                frontier[0].slots.extend_from_slice(&before[source].slots[range]);
            }
        }
        self.pages[page_index].slots.extend_from_slice(tail);
        self.len += total;

        Ok(Span {
            page: self.absolute(page_index),
            start: start as u32,
            len: total as u32,
        })
    }

    /// Contents of a run, or `None` if its page has been released.
    #[inline]
    pub fn slice(&self, span: Span) -> Option<&[T]> {
        let page = self.page(span.page)?;
        let start = span.start as usize;
        page.slots.get(start..start + span.len as usize)
    }
}
