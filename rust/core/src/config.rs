// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collector configuration: page capacities and print mode.

use crate::dump::PrintMode;
use crate::error::{Error, Result};

/// Page capacities and diagnostic settings for one [`StepReadData`](crate::StepReadData).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderConfig {
    /// Bytes per characters page. Longer texts get a page of their own size.
    pub max_chars_per_page: usize,
    /// Records per records page.
    pub max_records_per_page: usize,
    /// Arguments per arguments page.
    pub max_args_per_page: usize,
    /// Messages per errors page.
    pub max_errors_per_page: usize,
    /// Diagnostic dump level.
    pub print_mode: PrintMode,
}

impl ReaderConfig {
    pub const DEFAULT_MAX_CHARS: usize = 50_000;
    pub const DEFAULT_MAX_RECORDS: usize = 5_000;
    pub const DEFAULT_MAX_ARGS: usize = 10_000;
    pub const DEFAULT_MAX_ERRORS: usize = 256;

    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults; a variable that is set but
    /// does not parse is reported rather than ignored.
    pub fn from_env() -> Result<Self> {
        let print_mode = match env_value::<i32>("STEP_READ_PRINT_MODE")? {
            Some(mode) => PrintMode::try_from(mode)?,
            None => PrintMode::Silent,
        };

        Ok(Self {
            max_chars_per_page: env_value("STEP_READ_MAX_CHARS")?
                .unwrap_or(Self::DEFAULT_MAX_CHARS),
            max_records_per_page: env_value("STEP_READ_MAX_RECORDS")?
                .unwrap_or(Self::DEFAULT_MAX_RECORDS),
            max_args_per_page: env_value("STEP_READ_MAX_ARGS")?
                .unwrap_or(Self::DEFAULT_MAX_ARGS),
            max_errors_per_page: env_value("STEP_READ_MAX_ERRORS")?
                .unwrap_or(Self::DEFAULT_MAX_ERRORS),
            print_mode,
        }
        .normalized())
    }

    /// Same settings with every capacity raised to at least one slot.
    pub fn normalized(mut self) -> Self {
        self.max_chars_per_page = self.max_chars_per_page.max(1);
        self.max_records_per_page = self.max_records_per_page.max(1);
        self.max_args_per_page = self.max_args_per_page.max(1);
        self.max_errors_per_page = self.max_errors_per_page.max(1);
        self
    }

    /// Use the same capacity for all four page kinds. Mostly useful in tests
    /// that want to exercise page growth.
    pub fn with_page_capacity(mut self, capacity: usize) -> Self {
        self.max_chars_per_page = capacity;
        self.max_records_per_page = capacity;
        self.max_args_per_page = capacity;
        self.max_errors_per_page = capacity;
        self.normalized()
    }

    pub fn with_print_mode(mut self, mode: PrintMode) -> Self {
        self.print_mode = mode;
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_chars_per_page: Self::DEFAULT_MAX_CHARS,
            max_records_per_page: Self::DEFAULT_MAX_RECORDS,
            max_args_per_page: Self::DEFAULT_MAX_ARGS,
            max_errors_per_page: Self::DEFAULT_MAX_ERRORS,
            print_mode: PrintMode::Silent,
        }
    }
}

fn env_value<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config { key, value: raw }),
        Err(_) => Ok(None),
    }
}
