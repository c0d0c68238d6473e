//! Data types and error definitions for process lookup.

use thiserror::Error;

/// Represents a process entry read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i32,
    pub name: String,
    pub state: char,
    pub ppid: i32,
    pub euid: Option<u32>,
    pub egid: Option<u32>,
    pub priority: i64,
    pub nice: i64,
    /// `None` when requested but unreadable (usually permission denied).
    pub cmdline: Option<Vec<String>>,
    /// Raw environ entries in process order; `None` when requested but unreadable.
    pub environ: Option<Vec<String>>,
}

/// Optional sections to load from the snapshot and print for each match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields {
    pub info: bool,
    pub cmdline: bool,
    pub environ: bool,
}

/// System errors that abort a lookup run.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("Failed to open proc: {0}")]
    OpenTable(String),
    /// The reader of the output went away; not a lookup failure.
    #[error("Output closed")]
    OutputClosed,
    #[error("Write error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for ProcError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            ProcError::OutputClosed
        } else {
            ProcError::Io(err)
        }
    }
}

/// Opening the table is the only procfs call whose failure aborts a run.
impl From<procfs::ProcError> for ProcError {
    fn from(err: procfs::ProcError) -> Self {
        ProcError::OpenTable(err.to_string())
    }
}

/// Per-token failures. The display text is the line printed to stderr.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Invalid PID: {0}")]
    InvalidPid(String),
    #[error("Invalid regex: {pattern}: {reason}")]
    InvalidRegex {
        pattern: String,
        reason: String,
        #[source]
        source: regex::Error,
    },
    #[error("No process found by {kind} {token}")]
    NotFound { kind: &'static str, token: String },
}

impl LookupError {
    pub fn invalid_regex(pattern: &str, source: regex::Error) -> Self {
        LookupError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: one_line_reason(&source.to_string()),
            source,
        }
    }
}

/// Syntax errors render as a caret diagram ending in an `error: ` line; keep that line.
fn one_line_reason(text: &str) -> String {
    text.lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("error: "))
        .map(str::to_string)
        .unwrap_or_else(|| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        })
}
