// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse diagnostics: an append-only log of messages and the sink they are
//! flushed into.

use crate::error::{PageKind, Result};
use crate::page::PageList;

/// Origin label attached to every flushed message.
pub const PARSE_FAIL_ORIGIN: &str = "Undefined Parsing";

/// Receiver of flushed parse messages, typically the check list of the
/// model being read.
pub trait CheckCollector {
    /// Record one failure. `origin` names the stage that produced it.
    fn add_fail(&mut self, message: &str, origin: &str);
}

impl CheckCollector for Vec<String> {
    fn add_fail(&mut self, message: &str, _origin: &str) {
        self.push(message.to_owned());
    }
}

/// Messages in the order they were reported. Duplicates are kept.
#[derive(Debug)]
pub struct ErrorLog {
    messages: PageList<String>,
}

impl ErrorLog {
    pub fn new(messages_per_page: usize) -> Self {
        Self {
            messages: PageList::new(PageKind::Errors, messages_per_page),
        }
    }

    /// Copy `message` into the log.
    pub fn add(&mut self, message: &str) -> Result<()> {
        tracing::trace!(message, "parse error recorded");
        self.messages.push(message.to_owned())?;
        Ok(())
    }

    /// Hand every message to `collector`, oldest first. The log is left
    /// intact. Returns `true` when there was nothing to report.
    pub fn flush(&self, collector: &mut dyn CheckCollector) -> bool {
        for message in self.messages.iter() {
            collector.add_fail(message, PARSE_FAIL_ORIGIN);
        }
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.messages.page_count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
