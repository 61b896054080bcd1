// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record arguments: kinds, storage and typed read access.

use std::borrow::Cow;
use std::fmt;

use crate::page::SlotId;
use crate::record::RecordId;
use crate::text::TextRef;

/// Kind of a STEP parameter as classified by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamType {
    /// Quoted string: `'text'`
    Text,
    /// Entity reference: `#123`
    Ident,
    Integer,
    Real,
    /// `.T.`, `.F.` or `.U.`
    Logical,
    /// `.ELEMENT.`
    Enum,
    /// Parenthesized group, stored as a synthetic record.
    SubList,
    /// `$` or `*`
    Void,
    /// Token the scanner could not classify.
    #[default]
    Error,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Text => "Text",
            ParamType::Ident => "Ident",
            ParamType::Integer => "Integer",
            ParamType::Real => "Real",
            ParamType::Logical => "Logical",
            ParamType::Enum => "Enum",
            ParamType::SubList => "SubList",
            ParamType::Void => "Void",
            ParamType::Error => "Error",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// STEP three-valued logical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logical {
    True,
    False,
    Unknown,
}

/// Address of an argument in the arguments pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArgId(pub(crate) SlotId);

/// Stored argument. Arguments of one record form a singly linked chain in
/// append order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Argument {
    pub(crate) kind: ParamType,
    pub(crate) text: TextRef,
    /// Set for `SubList` arguments.
    pub(crate) sub_record: Option<RecordId>,
    pub(crate) next: Option<ArgId>,
}

/// Whether the token currently staged has already produced an argument.
///
/// `ErrorConsumed` additionally makes the scanner's next texts accumulate
/// into the last (error) argument instead of creating new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ArgGuard {
    #[default]
    AwaitingToken,
    TokenConsumed,
    ErrorConsumed,
}

/// Read-only view of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentView<'a> {
    kind: ParamType,
    text: &'a [u8],
    sub_record: Option<RecordId>,
}

impl<'a> ArgumentView<'a> {
    pub(crate) fn new(kind: ParamType, text: &'a [u8], sub_record: Option<RecordId>) -> Self {
        Self {
            kind,
            text,
            sub_record,
        }
    }

    #[inline]
    pub fn kind(&self) -> ParamType {
        self.kind
    }

    /// Raw text exactly as staged by the scanner. For sub-lists this is the
    /// synthetic identifier of the referenced record.
    #[inline]
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }

    /// Record holding the elements of a sub-list argument.
    #[inline]
    pub fn sub_record(&self) -> Option<RecordId> {
        self.sub_record
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.kind {
            ParamType::Integer => lexical_core::parse::<i64>(self.text).ok(),
            _ => None,
        }
    }

    /// Reals, and integers widened to reals.
    pub fn as_real(&self) -> Option<f64> {
        match self.kind {
            ParamType::Real | ParamType::Integer => fast_float::parse::<f64, _>(self.text).ok(),
            _ => None,
        }
    }

    pub fn as_logical(&self) -> Option<Logical> {
        if self.kind != ParamType::Logical {
            return None;
        }
        match strip_dots(self.text) {
            b"T" => Some(Logical::True),
            b"F" => Some(Logical::False),
            b"U" => Some(Logical::Unknown),
            _ => None,
        }
    }

    /// Enumeration value without the surrounding dots.
    pub fn as_enum(&self) -> Option<&'a [u8]> {
        match self.kind {
            ParamType::Enum | ParamType::Logical => Some(strip_dots(self.text)),
            _ => None,
        }
    }

    /// Number of a `#n` reference.
    pub fn as_entity_id(&self) -> Option<u32> {
        if self.kind != ParamType::Ident {
            return None;
        }
        match self.text.split_first() {
            Some((b'#', digits)) => lexical_core::parse::<u32>(digits).ok(),
            _ => None,
        }
    }

    /// String contents without the enclosing quotes. Doubled quotes are
    /// left as written.
    pub fn as_text(&self) -> Option<&'a [u8]> {
        if self.kind != ParamType::Text {
            return None;
        }
        match self.text {
            [b'\'', inner @ .., b'\''] => Some(inner),
            other => Some(other),
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.kind == ParamType::Void
    }
}

fn strip_dots(text: &[u8]) -> &[u8] {
    match text {
        [b'.', inner @ .., b'.'] => inner,
        other => other,
    }
}
