// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # StepFile Core
//!
//! Arena-backed record collector for STEP (ISO-10303-21) readers built from a
//! generated scanner and a generated shift-reduce parser.
//!
//! ## Overview
//!
//! The scanner and parser drive a [`StepReadData`] one event at a time. The
//! collector turns those events into a linked model of the file:
//!
//! - **Records**: one per entity instance, plus one synthetic `$n` record per
//!   parenthesized sub-list
//! - **Arguments**: typed parameter values in append order
//! - **Scopes**: spans of the record list delimited by the parser
//! - **Diagnostics**: messages flushed into a [`CheckCollector`] at the end
//!
//! Characters, records, arguments and messages are bump-allocated from
//! fixed-capacity pages and addressed by (page, slot) indices. Nothing is
//! freed individually; [`StepReadData::release`] drops pages in bulk.
//!
//! ## Quick Start
//!
//! ```rust
//! use stepfile_core::{ParamType, StepReadData};
//!
//! # fn main() -> stepfile_core::Result<()> {
//! // #7=CARTESIAN_POINT('',(0.0,1.5,2.0));
//! let mut data = StepReadData::new();
//! data.stage_text("#7")?;
//! data.begin_ident()?;
//! data.stage_text("CARTESIAN_POINT")?;
//! data.begin_type()?;
//! data.begin_list()?;
//! data.stage_text("''")?;
//! data.set_arg_type(ParamType::Text);
//! data.append_arg()?;
//! data.note_list_boundary();
//! data.begin_list()?;
//! for (i, coord) in ["0.0", "1.5", "2.0"].into_iter().enumerate() {
//!     if i > 0 {
//!         data.note_list_boundary();
//!     }
//!     data.stage_text(coord)?;
//!     data.set_arg_type(ParamType::Real);
//!     data.append_arg()?;
//! }
//! data.close_entity();
//! data.append_arg()?;
//! data.close_entity();
//!
//! let point = data.records().last().unwrap();
//! assert_eq!(point.type_name(), b"CARTESIAN_POINT");
//! let coords = point.sub_records().next().unwrap();
//! let values: Vec<f64> = coords.arguments().filter_map(|a| a.as_real()).collect();
//! assert_eq!(values, [0.0, 1.5, 2.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! One collector per file. Collectors are `Send` and share no state, so
//! several files can be read concurrently, each by its own
//! scanner/parser/collector triple.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for counters, kinds and settings

pub mod argument;
pub mod config;
pub mod diagnostics;
pub mod dump;
pub mod error;
pub mod page;
pub mod read_data;
pub mod record;
pub mod scope;
pub mod text;

pub use argument::{ArgumentView, Logical, ParamType};
pub use config::ReaderConfig;
pub use diagnostics::{CheckCollector, ErrorLog, PARSE_FAIL_ORIGIN};
pub use dump::{PrintMode, RecordDump};
pub use error::{Error, PageKind, Result};
pub use page::{PageStats, SlotId};
pub use read_data::{FileCounts, ReleaseMode, StepReadData};
pub use record::{Arguments, AssemblyState, RecordId, RecordView, Records};
pub use scope::ScopeSpan;
pub use text::{TextRef, SUB_LIST_TYPE, UNLABELED_IDENT};
