// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scopes: externally delimited spans of the global record list
//! (`&SCOPE ... ENDSCOPE` blocks, complex entity groups).
//!
//! A scope never changes the list itself. Entering records where the list
//! ends; leaving reports everything linked since then.

use smallvec::SmallVec;

use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    /// List tail at entry, `None` if the list was empty.
    after: Option<RecordId>,
    /// Linked record count at entry.
    linked: usize,
}

/// Records linked between a matching enter/leave pair, in list order.
///
/// The span only refers into the collector; iterate it with
/// [`StepReadData::scope_records`](crate::StepReadData::scope_records).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeSpan {
    pub(crate) after: Option<RecordId>,
    pub(crate) len: usize,
    pub(crate) depth: usize,
}

impl ScopeSpan {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nesting level of the scope, 1 for outermost.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Stack of open scopes.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    anchors: SmallVec<[Anchor; 4]>,
}

impl ScopeStack {
    pub(crate) fn enter(&mut self, tail: Option<RecordId>, linked: usize) {
        self.anchors.push(Anchor {
            after: tail,
            linked,
        });
    }

    /// Close the innermost scope. `None` when nothing is open.
    pub(crate) fn leave(&mut self, linked: usize) -> Option<ScopeSpan> {
        let depth = self.anchors.len();
        let anchor = self.anchors.pop()?;
        Some(ScopeSpan {
            after: anchor.after,
            len: linked - anchor.linked,
            depth,
        })
    }

    pub(crate) fn depth(&self) -> usize {
        self.anchors.len()
    }

    pub(crate) fn clear(&mut self) {
        self.anchors.clear();
    }
}
