//! Token classification and match predicates.

use crate::types::{LookupError, ProcessInfo};
use regex::Regex;
use tracing::debug;

/// How a scan decides whether a process matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    All,
    Name,
    Pid,
    Substring,
    Regex,
}

/// Match mode forced from the command line, or `Auto` to guess per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeOverride {
    #[default]
    Auto,
    Name,
    Pid,
    Substring,
    Regex,
}

/// A classified lookup token ready to test against processes.
#[derive(Debug, Clone)]
pub enum Query {
    All,
    Name(String),
    Pid(i32),
    Substring(String),
    Regex(Regex),
}

fn is_pid_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_pid(token: &str) -> Result<i32, LookupError> {
    if !is_pid_token(token) {
        return Err(LookupError::InvalidPid(token.to_string()));
    }
    token
        .parse::<i32>()
        .map_err(|_| LookupError::InvalidPid(token.to_string()))
}

impl Query {
    pub fn classify(token: &str, mode: ModeOverride) -> Result<Self, LookupError> {
        let query = match mode {
            ModeOverride::Auto if is_pid_token(token) => Query::Pid(parse_pid(token)?),
            ModeOverride::Auto | ModeOverride::Name => Query::Name(token.to_string()),
            ModeOverride::Pid => Query::Pid(parse_pid(token)?),
            ModeOverride::Substring => Query::Substring(token.to_string()),
            ModeOverride::Regex => {
                let re = Regex::new(token)
                    .map_err(|source| LookupError::invalid_regex(token, source))?;
                Query::Regex(re)
            }
        };
        debug!(token, mode = ?query.mode(), "classified token");
        Ok(query)
    }

    pub fn mode(&self) -> MatchMode {
        match self {
            Query::All => MatchMode::All,
            Query::Name(_) => MatchMode::Name,
            Query::Pid(_) => MatchMode::Pid,
            Query::Substring(_) => MatchMode::Substring,
            Query::Regex(_) => MatchMode::Regex,
        }
    }

    pub fn matches(&self, process: &ProcessInfo) -> bool {
        match self {
            Query::All => true,
            Query::Name(name) => process.name == *name,
            Query::Pid(pid) => process.pid == *pid,
            Query::Substring(needle) => process.name.contains(needle.as_str()),
            Query::Regex(re) => re.is_match(&process.name),
        }
    }

    /// PIDs are unique within a snapshot, so the scan can stop at the first hit.
    pub fn is_unique(&self) -> bool {
        matches!(self, Query::Pid(_))
    }

    /// Error reported when a scan finds nothing.
    pub fn not_found(&self) -> Option<LookupError> {
        let (kind, token) = match self {
            Query::All => return None,
            Query::Name(name) => ("name", name.clone()),
            Query::Pid(pid) => ("ID", pid.to_string()),
            Query::Substring(needle) => ("substring", needle.clone()),
            Query::Regex(re) => ("regex", re.as_str().to_string()),
        };
        Some(LookupError::NotFound { kind, token })
    }
}
