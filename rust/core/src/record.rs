// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Records: one STEP entity instance or one synthetic sub-list.

use std::borrow::Cow;

use crate::argument::{ArgId, ArgumentView};
use crate::page::SlotId;
use crate::read_data::StepReadData;
use crate::text::{TextRef, SYNTHETIC_PREFIX, UNLABELED_IDENT};

/// Stable address of a record in the records pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub(crate) SlotId);

impl RecordId {
    pub fn slot(self) -> SlotId {
        self.0
    }
}

/// Stored record. `next` links closed records into the global list.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Record {
    pub(crate) ident: TextRef,
    pub(crate) type_name: TextRef,
    pub(crate) first_arg: Option<ArgId>,
    pub(crate) last_arg: Option<ArgId>,
    pub(crate) arg_count: u32,
    pub(crate) next: Option<RecordId>,
}

impl Record {
    pub(crate) fn labeled(ident: TextRef) -> Self {
        Self {
            ident,
            ..Self::default()
        }
    }
}

/// Progress of the record under construction.
///
/// `Empty → IdentSet → TypeSet → AccumulatingArgs → Closed`, where a header
/// entity skips `IdentSet` and a closed sub-list returns its parent to
/// `AccumulatingArgs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyState {
    #[default]
    Empty,
    IdentSet,
    TypeSet,
    AccumulatingArgs,
    Closed,
}

impl AssemblyState {
    /// No record is open.
    pub fn is_idle(self) -> bool {
        matches!(self, AssemblyState::Empty | AssemblyState::Closed)
    }
}

/// Read-only view of a record and its arguments.
#[derive(Clone, Copy)]
pub struct RecordView<'a> {
    data: &'a StepReadData,
    id: RecordId,
    record: &'a Record,
}

impl<'a> RecordView<'a> {
    pub(crate) fn new(data: &'a StepReadData, id: RecordId, record: &'a Record) -> Self {
        Self { data, id, record }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// `#n` label, `$n` for sub-lists, `#0` for unlabeled header entities.
    pub fn ident(&self) -> &'a [u8] {
        self.data.resolve_text(self.record.ident)
    }

    /// Entity type name, empty if never set.
    pub fn type_name(&self) -> &'a [u8] {
        self.data.resolve_text(self.record.type_name)
    }

    pub fn ident_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.ident())
    }

    pub fn type_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.type_name())
    }

    pub fn arg_count(&self) -> usize {
        self.record.arg_count as usize
    }

    /// Generated for a parenthesized sub-list.
    pub fn is_synthetic(&self) -> bool {
        self.ident().first() == Some(&SYNTHETIC_PREFIX)
    }

    /// Header entity without a `#n` label.
    pub fn is_unlabeled(&self) -> bool {
        self.ident() == UNLABELED_IDENT.as_bytes()
    }

    /// Arguments in append order.
    pub fn arguments(&self) -> Arguments<'a> {
        Arguments {
            data: self.data,
            next: self.record.first_arg,
        }
    }

    pub fn argument(&self, index: usize) -> Option<ArgumentView<'a>> {
        self.arguments().nth(index)
    }

    /// Records of this record's sub-list arguments, in argument order.
    pub fn sub_records(&self) -> impl Iterator<Item = RecordView<'a>> + 'a {
        let data = self.data;
        self.arguments()
            .filter_map(|arg| arg.sub_record())
            .filter_map(move |id| data.record(id))
    }
}

impl std::fmt::Debug for RecordView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordView")
            .field("ident", &self.ident_lossy())
            .field("type", &self.type_lossy())
            .field("args", &self.arg_count())
            .finish()
    }
}

/// Iterator over the arguments of one record.
#[derive(Clone)]
pub struct Arguments<'a> {
    data: &'a StepReadData,
    next: Option<ArgId>,
}

impl<'a> Iterator for Arguments<'a> {
    type Item = ArgumentView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let arg = self.data.stored_argument(self.next?)?;
        self.next = arg.next;
        Some(ArgumentView::new(
            arg.kind,
            self.data.resolve_text(arg.text),
            arg.sub_record,
        ))
    }
}

/// Iterator over a run of the global record list.
#[derive(Clone)]
pub struct Records<'a> {
    data: &'a StepReadData,
    next: Option<RecordId>,
    remaining: usize,
}

impl<'a> Records<'a> {
    pub(crate) fn new(data: &'a StepReadData, first: Option<RecordId>, len: usize) -> Self {
        Self {
            data,
            next: first,
            remaining: len,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = RecordView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let view = self.data.record(id)?;
        self.next = self.data.next_linked(id);
        self.remaining -= 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
