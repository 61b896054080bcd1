// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text handles into the characters pages.

use crate::page::Span;

/// Identifier given to records that have a type but no `#n` label
/// (header entities such as `FILE_NAME`).
pub const UNLABELED_IDENT: &str = "#0";

/// Type given to a sub-list opened without a type prefix.
pub const SUB_LIST_TYPE: &str = "/* (SUB) */";

/// Prefix of generated sub-list identifiers (`$1`, `$2`, ...).
pub const SYNTHETIC_PREFIX: u8 = b'$';

/// Handle to a text value: either a span of the characters pages or one of
/// the reserved constants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRef {
    Static(&'static str),
    Paged(Span),
}

impl TextRef {
    pub const EMPTY: TextRef = TextRef::Static("");

    pub fn len(self) -> usize {
        match self {
            TextRef::Static(text) => text.len(),
            TextRef::Paged(span) => span.len(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl Default for TextRef {
    fn default() -> Self {
        TextRef::EMPTY
    }
}

/// Write `$n` into `buf` and return the used prefix.
pub(crate) fn synthetic_ident(n: u32, buf: &mut [u8; 11]) -> &[u8] {
    buf[0] = SYNTHETIC_PREFIX;
    let digits = lexical_core::write(n, &mut buf[1..]).len();
    &buf[..=digits]
}
