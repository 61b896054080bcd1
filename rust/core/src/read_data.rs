// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The read-data collector.
//!
//! [`StepReadData`] sits between a generated STEP scanner and a generated
//! shift-reduce parser. The scanner stages the text of each token it
//! recognizes; the parser turns reductions into record and argument events.
//! Every event leaves the collector in a well-defined intermediate state, so
//! an aborted parse still holds a consistent list of the records closed so
//! far.
//!
//! Events are trusted to arrive in grammar order. An event that arrives out
//! of order trips a `debug_assert!` in debug builds and is logged and
//! ignored in release builds.
//!
//! Worked example, `#123=ADVANCED_FACE('',(#124),#125);`:
//!
//! ```
//! use stepfile_core::{ParamType, StepReadData};
//!
//! # fn main() -> stepfile_core::Result<()> {
//! let mut data = StepReadData::new();
//! data.stage_text("#123")?;
//! data.begin_ident()?;
//! data.stage_text("ADVANCED_FACE")?;
//! data.begin_type()?;
//! data.begin_list()?;
//! data.stage_text("''")?;
//! data.set_arg_type(ParamType::Text);
//! data.append_arg()?;
//! data.note_list_boundary();
//! data.begin_list()?; // opens sub-list $1
//! data.stage_text("#124")?;
//! data.set_arg_type(ParamType::Ident);
//! data.append_arg()?;
//! data.close_entity(); // closes $1, primes a SubList argument
//! data.append_arg()?;
//! data.note_list_boundary();
//! data.stage_text("#125")?;
//! data.set_arg_type(ParamType::Ident);
//! data.append_arg()?;
//! data.close_entity();
//!
//! let idents: Vec<_> = data.records().map(|r| r.ident_lossy().into_owned()).collect();
//! assert_eq!(idents, ["$1", "#123"]);
//! # Ok(())
//! # }
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::argument::{ArgGuard, ArgId, Argument, ArgumentView, ParamType};
use crate::config::ReaderConfig;
use crate::diagnostics::{CheckCollector, ErrorLog};
use crate::dump::{PrintMode, RecordDump};
use crate::error::{Error, PageKind, Result};
use crate::page::{PageList, PageStats, Span};
use crate::record::{AssemblyState, Record, RecordId, RecordView, Records};
use crate::scope::{ScopeSpan, ScopeStack};
use crate::text::{synthetic_ident, TextRef, SUB_LIST_TYPE, UNLABELED_IDENT};

/// Which pages [`StepReadData::release`] drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Record and argument pages.
    Records = 1,
    /// Character pages.
    Characters = 2,
    /// Everything, back to the freshly constructed state.
    All = 3,
}

impl ReleaseMode {
    fn includes(self, other: ReleaseMode) -> bool {
        (self as i32) & (other as i32) != 0
    }
}

impl TryFrom<i32> for ReleaseMode {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(ReleaseMode::Records),
            2 => Ok(ReleaseMode::Characters),
            3 => Ok(ReleaseMode::All),
            other => Err(Error::InvalidReleaseMode(other)),
        }
    }
}

/// Record and parameter counters of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileCounts {
    /// Records closed in the header section.
    pub header_records: usize,
    /// All records closed, sub-lists included.
    pub records: usize,
    /// All arguments created.
    pub parameters: usize,
}

/// Collector of records, arguments, scopes and diagnostics for one STEP file.
///
/// One instance serves exactly one scanner/parser pair. Independent
/// instances share nothing and may live on different threads.
#[derive(Debug)]
pub struct StepReadData {
    chars: PageList<u8>,
    records: PageList<Record>,
    args: PageList<Argument>,
    errors: ErrorLog,
    scopes: ScopeStack,

    /// Last text handed over by the scanner. Overwritten by every stage call.
    staged: Option<Span>,
    pending_kind: ParamType,
    /// Type for the next sub-list, set by a typed list prefix.
    pending_list_type: TextRef,
    guard: ArgGuard,
    state: AssemblyState,

    /// Record under construction while building, read cursor afterwards.
    current: Option<RecordId>,
    /// Enclosing records of an open sub-list, innermost last.
    open: SmallVec<[RecordId; 8]>,
    /// Most recently closed record; the target of the next SubList argument.
    last_closed: Option<RecordId>,
    sub_counter: u32,
    arg_cursor: Option<ArgId>,

    head: Option<RecordId>,
    tail: Option<RecordId>,
    linked: usize,

    counts: FileCounts,
    in_header: bool,
    print_mode: PrintMode,
}

impl StepReadData {
    /// Collector with the default page capacities.
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /// Collector with explicit page capacities and print mode. Capacities
    /// below one are raised to one.
    pub fn with_config(config: ReaderConfig) -> Self {
        let config = config.normalized();
        Self {
            chars: PageList::new(PageKind::Characters, config.max_chars_per_page),
            records: PageList::new(PageKind::Records, config.max_records_per_page),
            args: PageList::new(PageKind::Arguments, config.max_args_per_page),
            errors: ErrorLog::new(config.max_errors_per_page),
            scopes: ScopeStack::default(),
            staged: None,
            pending_kind: ParamType::default(),
            pending_list_type: TextRef::Static(SUB_LIST_TYPE),
            guard: ArgGuard::default(),
            state: AssemblyState::default(),
            current: None,
            open: SmallVec::new(),
            last_closed: None,
            sub_counter: 0,
            arg_cursor: None,
            head: None,
            tail: None,
            linked: 0,
            counts: FileCounts::default(),
            in_header: true,
            print_mode: config.print_mode,
        }
    }

    // --- Scanner events ---

    /// Copy a token's text into the characters pages and make it the staged
    /// value. The previous staged value stays readable through any record
    /// or argument that already references it.
    ///
    /// While an error argument is accumulating, the text is appended to the
    /// previously staged text instead.
    pub fn stage_text(&mut self, text: impl AsRef<[u8]>) -> Result<()> {
        let text = text.as_ref();
        let span = match (self.guard, self.staged) {
            (ArgGuard::ErrorConsumed, Some(previous)) => self.chars.push_concat(previous, text)?,
            _ => self.chars.push_slice(text)?,
        };
        self.staged = Some(span);
        Ok(())
    }

    /// Choose the kind of the next argument.
    pub fn set_arg_type(&mut self, kind: ParamType) {
        self.pending_kind = kind;
    }

    /// A `,` was seen: the next token produces a new argument.
    pub fn note_list_boundary(&mut self) {
        self.guard = ArgGuard::AwaitingToken;
    }

    // --- Parser events ---

    /// Start a record labeled with the staged text.
    ///
    /// A label arriving while a record is still accepting arguments opens
    /// a sub-list of that record instead.
    pub fn begin_ident(&mut self) -> Result<()> {
        match self.state {
            AssemblyState::TypeSet | AssemblyState::AccumulatingArgs if self.current.is_some() => {
                tracing::debug!("entity label inside an open record, opening a sub-list");
                self.sub_counter = self.sub_counter.max(1);
                self.open_sub_record()?;
                self.sub_counter += 1;
                return Ok(());
            }
            AssemblyState::IdentSet => self.contract_violation("begin_ident"),
            _ => {}
        }

        let ident = self.staged_ref();
        let id = self.alloc_record(Record::labeled(ident))?;
        self.current = Some(id);
        self.open.clear();
        self.sub_counter = 0;
        self.state = AssemblyState::IdentSet;
        tracing::trace!(ident = %String::from_utf8_lossy(self.resolve_text(ident)), "begin record");
        Ok(())
    }

    /// Set the staged text as the type of the current record. Without a
    /// preceding label this starts an unlabeled (`#0`) header record.
    pub fn begin_type(&mut self) -> Result<()> {
        let type_name = self.staged_ref();
        match (self.state, self.current) {
            (AssemblyState::IdentSet, Some(id)) => {
                if let Some(record) = self.records.get_mut(id.0) {
                    record.type_name = type_name;
                }
            }
            (state, _) => {
                if !state.is_idle() {
                    self.contract_violation("begin_type");
                }
                let record = Record {
                    type_name,
                    ..Record::labeled(TextRef::Static(UNLABELED_IDENT))
                };
                self.current = Some(self.alloc_record(record)?);
            }
        }
        self.open.clear();
        self.sub_counter = 0;
        self.state = AssemblyState::TypeSet;
        Ok(())
    }

    /// Keep the staged text as the type of the next sub-list, for typed
    /// parameters such as `LENGTH_MEASURE(2.5)`.
    pub fn begin_list_type(&mut self) {
        self.pending_list_type = self.staged_ref();
    }

    /// A `(` was seen. The first one after the type opens the record's own
    /// argument list; every further one opens a sub-list record `$n`.
    pub fn begin_list(&mut self) -> Result<()> {
        if self.current.is_none() {
            self.contract_violation("begin_list");
            return Ok(());
        }
        if self.sub_counter > 0 {
            self.open_sub_record()?;
        } else {
            self.state = AssemblyState::AccumulatingArgs;
        }
        self.guard = ArgGuard::AwaitingToken;
        self.sub_counter += 1;
        Ok(())
    }

    /// Append an argument of the chosen kind to the current record.
    ///
    /// Text comes from the staged value; a `SubList` argument refers to the
    /// record closed last. Only the first call per token creates an
    /// argument; repeats are ignored until a boundary resets the guard,
    /// except that further error tokens update the pending error argument.
    pub fn append_arg(&mut self) -> Result<()> {
        let Some(current) = self.current else {
            self.contract_violation("append_arg");
            return Ok(());
        };
        match self.guard {
            ArgGuard::AwaitingToken => {}
            ArgGuard::ErrorConsumed if self.pending_kind == ParamType::Error => {
                self.refresh_error_arg();
                return Ok(());
            }
            _ => {
                tracing::trace!(kind = %self.pending_kind, "argument already created for this token");
                return Ok(());
            }
        }

        let kind = self.pending_kind;
        let (text, sub_record) = match kind {
            ParamType::SubList => {
                let closed = self
                    .last_closed
                    .and_then(|id| self.records.get(id.0).map(|record| (record.ident, id)));
                match closed {
                    Some((ident, id)) => (ident, Some(id)),
                    None => (TextRef::EMPTY, None),
                }
            }
            _ => (self.staged_ref(), None),
        };

        let arg_id = ArgId(self.args.push(Argument {
            kind,
            text,
            sub_record,
            next: None,
        })?);
        let previous = self.records.get(current.0).and_then(|record| record.last_arg);
        match previous.and_then(|last| self.args.get_mut(last.0)) {
            Some(last) => last.next = Some(arg_id),
            None => {
                if let Some(record) = self.records.get_mut(current.0) {
                    record.first_arg = Some(arg_id);
                }
            }
        }
        if let Some(record) = self.records.get_mut(current.0) {
            record.last_arg = Some(arg_id);
            record.arg_count += 1;
        }

        self.counts.parameters += 1;
        self.guard = if kind == ParamType::Error {
            ArgGuard::ErrorConsumed
        } else {
            ArgGuard::TokenConsumed
        };
        self.state = AssemblyState::AccumulatingArgs;
        Ok(())
    }

    /// Record a token the grammar could not place. A run of such tokens
    /// collapses into one `Error` argument holding their concatenated text.
    pub fn append_error_arg(&mut self) -> Result<()> {
        if self.guard == ArgGuard::ErrorConsumed {
            self.refresh_error_arg();
            return Ok(());
        }
        self.pending_kind = ParamType::Error;
        self.guard = ArgGuard::AwaitingToken;
        self.append_arg()
    }

    /// A `)` closed the current record or sub-list.
    ///
    /// The record is linked at the end of the global list and the enclosing
    /// record, if any, becomes current again with a `SubList` argument
    /// primed to refer to the closed one. The sub-list number drops back to
    /// the enclosing level, so `$n` always names the nesting depth.
    pub fn close_entity(&mut self) {
        let Some(id) = self.current else {
            self.contract_violation("close_entity");
            return;
        };
        self.guard = ArgGuard::AwaitingToken;
        self.link_record(id);
        self.last_closed = Some(id);
        self.pending_kind = ParamType::SubList;
        self.current = self.open.pop();
        self.state = if self.current.is_some() {
            self.sub_counter = self.sub_counter.saturating_sub(1);
            AssemblyState::AccumulatingArgs
        } else {
            AssemblyState::Closed
        };
    }

    /// The header section is over; later records are data records.
    pub fn end_header(&mut self) {
        self.in_header = false;
        self.counts.header_records = self.counts.records;
    }

    /// Move the cursor to the next record of the global list.
    pub fn advance_to_next_record(&mut self) {
        self.current = self
            .current
            .and_then(|id| self.records.get(id.0))
            .and_then(|record| record.next);
        self.reset_arg_cursor();
    }

    /// Open a scope at the current end of the record list.
    pub fn enter_scope(&mut self) {
        self.scopes.enter(self.tail, self.linked);
    }

    /// Close the innermost scope and return the records linked since it was
    /// entered. Returns `None`, after tripping a debug assertion, when no
    /// scope is open.
    pub fn leave_scope(&mut self) -> Option<ScopeSpan> {
        let span = self.scopes.leave(self.linked);
        if span.is_none() {
            self.contract_violation("leave_scope");
        }
        span
    }

    /// Copy a diagnostic message into the error log.
    pub fn add_error(&mut self, message: &str) -> Result<()> {
        self.errors.add(message)
    }

    // --- Queries ---

    /// Position the cursor on the first record and return the counters.
    pub fn rewind(&mut self) -> FileCounts {
        self.current = self.head;
        self.reset_arg_cursor();
        self.counts
    }

    /// Record under construction, or under the read cursor.
    pub fn current_record(&self) -> Option<RecordView<'_>> {
        self.record(self.current?)
    }

    /// Next argument of the record under the cursor.
    pub fn next_argument(&mut self) -> Option<ArgumentView<'_>> {
        let id = self.arg_cursor?;
        let arg = *self.args.get(id.0)?;
        self.arg_cursor = arg.next;
        Some(ArgumentView::new(
            arg.kind,
            self.resolve_text(arg.text),
            arg.sub_record,
        ))
    }

    /// Record by id, `None` once its page has been released.
    pub fn record(&self, id: RecordId) -> Option<RecordView<'_>> {
        self.records
            .get(id.0)
            .map(|record| RecordView::new(self, id, record))
    }

    /// Closed records from head to tail.
    pub fn records(&self) -> Records<'_> {
        Records::new(self, self.head, self.linked)
    }

    /// Records of a scope returned by [`leave_scope`](Self::leave_scope).
    pub fn scope_records(&self, span: &ScopeSpan) -> Records<'_> {
        let first = match span.after {
            Some(anchor) => self.records.get(anchor.0).and_then(|record| record.next),
            None => self.head,
        };
        Records::new(self, first, span.len)
    }

    /// Map from literal `#n` labels to records. Sub-lists and unlabeled
    /// header records are skipped.
    pub fn ident_index(&self) -> FxHashMap<&[u8], RecordId> {
        let mut index = FxHashMap::with_capacity_and_hasher(self.linked, Default::default());
        for record in self.records() {
            let ident = record.ident();
            if ident.first() == Some(&b'#') && !record.is_unlabeled() {
                index.insert(ident, record.id());
            }
        }
        index
    }

    /// Currently staged text.
    pub fn staged_text(&self) -> &[u8] {
        self.resolve_text(self.staged_ref())
    }

    /// Header, record and parameter counters.
    pub fn counts(&self) -> FileCounts {
        self.counts
    }

    /// Records closed so far, sub-lists included.
    pub fn record_count(&self) -> usize {
        self.counts.records
    }

    /// Records closed before [`end_header`](Self::end_header).
    pub fn header_record_count(&self) -> usize {
        self.counts.header_records
    }

    /// Arguments created so far.
    pub fn parameter_count(&self) -> usize {
        self.counts.parameters
    }

    /// Number of sub-lists open in the record under construction.
    pub fn nesting_depth(&self) -> usize {
        self.open.len()
    }

    /// Number of scopes entered and not yet left.
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Progress of the record under construction.
    pub fn assembly_state(&self) -> AssemblyState {
        self.state
    }

    /// Pages currently held by each allocator.
    pub fn page_stats(&self) -> PageStats {
        PageStats {
            character_pages: self.chars.page_count(),
            record_pages: self.records.page_count(),
            argument_pages: self.args.page_count(),
            error_pages: self.errors.page_count(),
        }
    }

    /// Change what [`print_current_record`](Self::print_current_record) emits.
    pub fn set_print_mode(&mut self, mode: PrintMode) {
        self.print_mode = mode;
    }

    /// Current diagnostic dump level.
    pub fn print_mode(&self) -> PrintMode {
        self.print_mode
    }

    /// Log the current record at the configured print mode.
    pub fn print_current_record(&self) {
        if self.print_mode == PrintMode::Silent {
            return;
        }
        match self.current_record() {
            Some(record) => tracing::info!(
                number = self.counts.records + 1,
                "{}",
                RecordDump::new(record, self.print_mode)
            ),
            None => tracing::info!("Not defined"),
        }
    }

    // --- Diagnostics ---

    /// Messages logged so far, oldest first.
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Hand every logged message to `collector`. Returns `true` if there
    /// were none.
    pub fn flush_errors(&self, collector: &mut dyn CheckCollector) -> bool {
        self.errors.flush(collector)
    }

    /// Most recent message.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last()
    }

    // --- Teardown ---

    /// Drop pages in bulk. Releasing something already released is a no-op.
    pub fn release(&mut self, mode: ReleaseMode) {
        tracing::debug!(?mode, "releasing collector pages");
        if mode.includes(ReleaseMode::Records) {
            self.records.clear();
            self.args.clear();
            self.scopes.clear();
            self.open.clear();
            self.current = None;
            self.last_closed = None;
            self.arg_cursor = None;
            self.head = None;
            self.tail = None;
            self.linked = 0;
            self.sub_counter = 0;
            self.guard = ArgGuard::AwaitingToken;
            self.state = AssemblyState::Empty;
        }
        if mode.includes(ReleaseMode::Characters) {
            self.chars.clear();
            self.staged = None;
            self.pending_list_type = TextRef::Static(SUB_LIST_TYPE);
        }
        if mode == ReleaseMode::All {
            self.errors.clear();
            self.counts = FileCounts::default();
            self.in_header = true;
            self.pending_kind = ParamType::default();
        }
    }

    // --- Internals ---

    pub(crate) fn resolve_text(&self, text: TextRef) -> &[u8] {
        match text {
            TextRef::Static(text) => text.as_bytes(),
            TextRef::Paged(span) => self.chars.slice(span).unwrap_or_default(),
        }
    }

    pub(crate) fn stored_argument(&self, id: ArgId) -> Option<&Argument> {
        self.args.get(id.0)
    }

    pub(crate) fn next_linked(&self, id: RecordId) -> Option<RecordId> {
        self.records.get(id.0).and_then(|record| record.next)
    }

    fn staged_ref(&self) -> TextRef {
        self.staged.map_or(TextRef::EMPTY, TextRef::Paged)
    }

    fn alloc_record(&mut self, record: Record) -> Result<RecordId> {
        Ok(RecordId(self.records.push(record)?))
    }

    fn open_sub_record(&mut self) -> Result<()> {
        let Some(parent) = self.current else {
            self.contract_violation("open sub-list");
            return Ok(());
        };
        let mut buf = [0u8; 11];
        let ident = self.chars.push_slice(synthetic_ident(self.sub_counter, &mut buf))?;
        let type_name = std::mem::replace(
            &mut self.pending_list_type,
            TextRef::Static(SUB_LIST_TYPE),
        );
        let id = self.alloc_record(Record {
            type_name,
            ..Record::labeled(TextRef::Paged(ident))
        })?;
        self.open.push(parent);
        self.current = Some(id);
        self.state = AssemblyState::AccumulatingArgs;
        tracing::trace!(sub = self.sub_counter, depth = self.open.len(), "opened sub-list");
        Ok(())
    }

    fn refresh_error_arg(&mut self) {
        let text = self.staged_ref();
        let last = self
            .current
            .and_then(|id| self.records.get(id.0))
            .and_then(|record| record.last_arg);
        if let Some(arg) = last.and_then(|id| self.args.get_mut(id.0)) {
            arg.text = text;
        }
    }

    fn link_record(&mut self, id: RecordId) {
        match self.tail.and_then(|tail| self.records.get_mut(tail.0)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.linked += 1;
        self.counts.records += 1;
        if self.in_header {
            self.counts.header_records += 1;
        }
    }

    fn reset_arg_cursor(&mut self) {
        self.arg_cursor = self
            .current
            .and_then(|id| self.records.get(id.0))
            .and_then(|record| record.first_arg);
    }

    fn contract_violation(&self, event: &'static str) {
        tracing::warn!(event, state = ?self.state, "event out of grammar order ignored");
        debug_assert!(false, "{event} called in state {:?}", self.state);
    }
}

impl Default for StepReadData {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StepReadData {
    fn drop(&mut self) {
        if self.scopes.depth() > 0 {
            tracing::warn!(open = self.scopes.depth(), "collector dropped with open scopes");
        }
    }
}
