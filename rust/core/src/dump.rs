// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic record dumps.

use std::fmt;

use crate::error::Error;
use crate::record::RecordView;

/// How much [`StepReadData::print_current_record`](crate::StepReadData::print_current_record)
/// emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrintMode {
    #[default]
    Silent = 0,
    /// Identifier and type only.
    Records = 1,
    /// Identifier, type and every argument.
    Arguments = 2,
}

impl TryFrom<i32> for PrintMode {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PrintMode::Silent),
            1 => Ok(PrintMode::Records),
            2 => Ok(PrintMode::Arguments),
            other => Err(Error::InvalidPrintMode(other)),
        }
    }
}

impl From<PrintMode> for i32 {
    fn from(mode: PrintMode) -> Self {
        mode as i32
    }
}

/// Formats a record the way the print mode asks for.
///
/// ```text
/// Ident #123  ADVANCED_FACE
///   - Arg.1 (Text) : ''
///   - Arg.2 (SubList) : $1
/// ```
pub struct RecordDump<'a> {
    record: RecordView<'a>,
    mode: PrintMode,
}

impl<'a> RecordDump<'a> {
    pub fn new(record: RecordView<'a>, mode: PrintMode) -> Self {
        Self { record, mode }
    }
}

impl fmt::Display for RecordDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == PrintMode::Silent {
            return Ok(());
        }
        write!(
            f,
            "Ident {}  {}",
            self.record.ident_lossy(),
            self.record.type_lossy()
        )?;
        if self.mode == PrintMode::Arguments {
            for (index, arg) in self.record.arguments().enumerate() {
                write!(
                    f,
                    "\n  - Arg.{} ({}) : {}",
                    index + 1,
                    arg.kind(),
                    arg.text_lossy()
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_int() {
        assert_eq!(PrintMode::try_from(0).unwrap(), PrintMode::Silent);
        assert_eq!(PrintMode::try_from(2).unwrap(), PrintMode::Arguments);
        assert!(matches!(PrintMode::try_from(3), Err(Error::InvalidPrintMode(3))));
        assert_eq!(i32::from(PrintMode::Records), 1);
    }
}
