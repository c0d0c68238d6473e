//! Process table snapshots backed by `/proc`.

use crate::types::{Fields, ProcError, ProcessInfo};
use procfs::process::Process;
use std::io::Read;
use std::os::unix::fs::MetadataExt;
use tracing::{debug, trace};

/// Anything that can open a point-in-time view of the process table.
pub trait ProcessSource {
    fn snapshot(&self, fields: Fields) -> Result<Snapshot, ProcError>;
}

/// Lazy iterator over one snapshot. The underlying handle is released on drop.
pub struct Snapshot {
    entries: Box<dyn Iterator<Item = ProcessInfo>>,
}

impl Snapshot {
    pub fn new<I>(entries: I) -> Self
    where
        I: Iterator<Item = ProcessInfo> + 'static,
    {
        Self {
            entries: Box::new(entries),
        }
    }

    pub fn from_entries(entries: Vec<ProcessInfo>) -> Self {
        Self::new(entries.into_iter())
    }
}

impl Iterator for Snapshot {
    type Item = ProcessInfo;

    fn next(&mut self) -> Option<ProcessInfo> {
        self.entries.next()
    }
}

/// Live process table read through procfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsSource;

impl ProcessSource for ProcfsSource {
    fn snapshot(&self, fields: Fields) -> Result<Snapshot, ProcError> {
        debug!(?fields, "opening process snapshot");
        let all_procs = procfs::process::all_processes()?;

        let entries = all_procs.filter_map(move |proc_result| match proc_result {
            Ok(proc) => read_process(&proc, fields),
            Err(e) => {
                trace!(error = %e, "skipping unreadable /proc entry");
                None
            }
        });

        Ok(Snapshot::new(entries))
    }
}

/// Read one process. Returns `None` if it vanished or its stat is unreadable.
fn read_process(proc: &Process, fields: Fields) -> Option<ProcessInfo> {
    let stat = match proc.stat() {
        Ok(stat) => stat,
        Err(e) => {
            trace!(pid = proc.pid(), error = %e, "skipping process without stat");
            return None;
        }
    };

    let mut info = ProcessInfo {
        pid: stat.pid,
        name: stat.comm,
        state: stat.state,
        ppid: stat.ppid,
        priority: stat.priority,
        nice: stat.nice,
        ..ProcessInfo::default()
    };

    if fields.info {
        // Owner of /proc/<pid> is the effective uid/gid; procfs only exposes the uid.
        info.euid = proc.uid().ok();
        info.egid = std::fs::metadata(format!("/proc/{}", proc.pid()))
            .ok()
            .map(|meta| meta.gid());
    }

    if fields.cmdline {
        info.cmdline = proc.cmdline().ok();
    }

    if fields.environ {
        info.environ = read_environ(proc);
    }

    Some(info)
}

/// Raw `/proc/<pid>/environ`, kept in process order with duplicates intact.
fn read_environ(proc: &Process) -> Option<Vec<String>> {
    let mut file = proc.open_relative("environ").ok()?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).ok()?;
    Some(split_environ(&buf))
}

fn split_environ(buf: &[u8]) -> Vec<String> {
    buf.split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .collect()
}
