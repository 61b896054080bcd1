// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the read-data collector.
//!
//! Only resource exhaustion and malformed settings are runtime errors.
//! Malformed STEP content is not an error here: it is recorded in the
//! [`ErrorLog`](crate::diagnostics::ErrorLog) and the parse continues.

use std::fmt;

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which page allocator an allocation failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Characters,
    Records,
    Arguments,
    Errors,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageKind::Characters => "characters",
            PageKind::Records => "records",
            PageKind::Arguments => "arguments",
            PageKind::Errors => "errors",
        };
        f.write_str(name)
    }
}

/// Errors that can abort a parse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A new page could not be allocated.
    #[error("failed to allocate a {kind} page of {requested} slots")]
    PageAllocation { kind: PageKind, requested: usize },

    #[error("invalid print mode {0}: expected 0, 1 or 2")]
    InvalidPrintMode(i32),

    #[error("invalid release mode {0}: expected 1, 2 or 3")]
    InvalidReleaseMode(i32),

    /// An environment override is present but not parsable.
    #[error("invalid configuration value for {key}: {value:?}")]
    Config { key: &'static str, value: String },
}

impl Error {
    pub(crate) fn allocation(kind: PageKind, requested: usize) -> Self {
        Error::PageAllocation { kind, requested }
    }
}
