//! UI-agnostic process lookup library for Linux.
//!
//! Provides snapshot access to the process table, token classification, match
//! predicates, and the lookup loop that prints matching processes.
//! Uses `procfs` for system interaction and `regex` for pattern matching.

mod format;
mod lookup;
mod matcher;
mod process_list;
mod types;

pub use format::write_entry;
pub use lookup::{lookup, LookupOptions, Outcome};
pub use matcher::{MatchMode, ModeOverride, Query};
pub use process_list::{ProcessSource, ProcfsSource, Snapshot};
pub use types::{Fields, LookupError, ProcError, ProcessInfo};
