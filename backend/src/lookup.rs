//! The per-token lookup loop.

use crate::format::write_entry;
use crate::matcher::{ModeOverride, Query};
use crate::process_list::ProcessSource;
use crate::types::{Fields, ProcError};
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub show_all: bool,
    pub mode: ModeOverride,
    pub fields: Fields,
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub matched: usize,
    pub failed: usize,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Scan one fresh snapshot for `query`, printing every match. Returns the match count.
fn scan<S, W>(
    source: &S,
    query: &Query,
    options: &LookupOptions,
    out: &mut W,
    outcome: &mut Outcome,
) -> Result<usize, ProcError>
where
    S: ProcessSource + ?Sized,
    W: Write,
{
    let mut found = 0;
    for process in source.snapshot(options.fields)? {
        if !query.matches(&process) {
            continue;
        }
        found += 1;
        write_entry(out, &process, &options.fields)?;
        outcome.matched += 1;
        if query.is_unique() {
            break;
        }
    }
    Ok(found)
}

/// Look up every token, or every process when `show_all` is set.
///
/// Matches go to `out`, per-token failures to `err`. A closed reader ends the
/// run quietly with the totals so far; other system failures (process table
/// unavailable, write errors) abort it.
pub fn lookup<S, O, E>(
    source: &S,
    options: &LookupOptions,
    tokens: &[String],
    out: &mut O,
    err: &mut E,
) -> Result<Outcome, ProcError>
where
    S: ProcessSource + ?Sized,
    O: Write,
    E: Write,
{
    let mut outcome = Outcome::default();
    match run_tokens(source, options, tokens, out, err, &mut outcome) {
        Err(ProcError::OutputClosed) => {
            debug!(matched = outcome.matched, "output closed, stopping");
            Ok(outcome)
        }
        Err(e) => Err(e),
        Ok(()) => Ok(outcome),
    }
}

fn run_tokens<S, O, E>(
    source: &S,
    options: &LookupOptions,
    tokens: &[String],
    out: &mut O,
    err: &mut E,
    outcome: &mut Outcome,
) -> Result<(), ProcError>
where
    S: ProcessSource + ?Sized,
    O: Write,
    E: Write,
{
    if options.show_all {
        scan(source, &Query::All, options, out, outcome)?;
        return Ok(());
    }

    for token in tokens {
        let query = match Query::classify(token, options.mode) {
            Ok(query) => query,
            Err(e) => {
                writeln!(err, "{}", e)?;
                outcome.failed += 1;
                continue;
            }
        };

        let found = scan(source, &query, options, out, outcome)?;
        debug!(token = %token, found, "token scanned");

        if found == 0 {
            if let Some(e) = query.not_found() {
                writeln!(err, "{}", e)?;
            }
            outcome.failed += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process_list::Snapshot;
    use crate::types::ProcessInfo;
    use std::cell::{Cell, RefCell};

    struct FakeSource {
        processes: Vec<ProcessInfo>,
        opened: Cell<usize>,
        requested: RefCell<Vec<Fields>>,
    }

    impl FakeSource {
        fn new(processes: &[(i32, &str)]) -> Self {
            Self {
                processes: processes
                    .iter()
                    .map(|(pid, name)| ProcessInfo {
                        pid: *pid,
                        name: name.to_string(),
                        state: 'S',
                        ppid: 1,
                        ..ProcessInfo::default()
                    })
                    .collect(),
                opened: Cell::new(0),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessSource for FakeSource {
        fn snapshot(&self, fields: Fields) -> Result<Snapshot, ProcError> {
            self.opened.set(self.opened.get() + 1);
            self.requested.borrow_mut().push(fields);
            Ok(Snapshot::from_entries(self.processes.clone()))
        }
    }

    struct BrokenSource;

    impl ProcessSource for BrokenSource {
        fn snapshot(&self, _fields: Fields) -> Result<Snapshot, ProcError> {
            Err(ProcError::OpenTable("no such directory".to_string()))
        }
    }

    fn run(
        source: &dyn ProcessSource,
        options: LookupOptions,
        tokens: &[&str],
    ) -> (Outcome, String, String) {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let outcome = lookup(source, &options, &tokens, &mut out, &mut err).unwrap();
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn table() -> FakeSource {
        FakeSource::new(&[(1, "init"), (20, "bash"), (21, "bash"), (30, "kworker/0:1")])
    }

    #[test]
    fn name_lookup_prints_every_match() {
        let (outcome, out, err) = run(&table(), LookupOptions::default(), &["bash"]);
        assert_eq!(out, "bash - pid=20\nbash - pid=21\n");
        assert!(err.is_empty());
        assert_eq!(outcome, Outcome { matched: 2, failed: 0 });
        assert!(outcome.success());
    }

    #[test]
    fn pid_lookup_stops_at_first_match() {
        let source = FakeSource::new(&[(5, "a"), (5, "b")]);
        let (outcome, out, _) = run(&source, LookupOptions::default(), &["5"]);
        assert_eq!(out, "a - pid=5\n");
        assert_eq!(outcome.matched, 1);
    }

    #[test]
    fn missing_tokens_fail_but_processing_continues() {
        let (outcome, out, err) =
            run(&table(), LookupOptions::default(), &["zsh", "99", "init"]);
        assert_eq!(out, "init - pid=1\n");
        assert_eq!(err, "No process found by name zsh\nNo process found by ID 99\n");
        assert_eq!(outcome, Outcome { matched: 1, failed: 2 });
        assert!(!outcome.success());
    }

    #[test]
    fn invalid_tokens_skip_the_scan() {
        let source = table();
        let options = LookupOptions {
            mode: ModeOverride::Pid,
            ..LookupOptions::default()
        };
        let (outcome, out, err) = run(&source, options, &["bash", "20"]);
        assert_eq!(out, "bash - pid=20\n");
        assert_eq!(err, "Invalid PID: bash\n");
        assert_eq!(outcome.failed, 1);
        assert_eq!(source.opened.get(), 1);
    }

    #[test]
    fn fresh_snapshot_per_token() {
        let source = table();
        run(&source, LookupOptions::default(), &["bash", "init", "1"]);
        assert_eq!(source.opened.get(), 3);
    }

    #[test]
    fn show_all_scans_once_and_never_reports_missing() {
        let source = table();
        let options = LookupOptions {
            show_all: true,
            ..LookupOptions::default()
        };
        let (outcome, out, err) = run(&source, options, &[]);
        assert_eq!(out.lines().count(), 4);
        assert!(err.is_empty());
        assert_eq!(outcome.matched, 4);
        assert!(outcome.success());
        assert_eq!(source.opened.get(), 1);

        let (outcome, _, err) = run(&FakeSource::new(&[]), options, &[]);
        assert!(outcome.success());
        assert!(err.is_empty());
    }

    #[test]
    fn substring_and_regex_modes() {
        let options = LookupOptions {
            mode: ModeOverride::Substring,
            ..LookupOptions::default()
        };
        let (_, out, _) = run(&table(), options, &["work"]);
        assert_eq!(out, "kworker/0:1 - pid=30\n");

        let options = LookupOptions {
            mode: ModeOverride::Regex,
            ..LookupOptions::default()
        };
        let (outcome, out, err) = run(&table(), options, &["^(init|bash)$", "["]);
        assert_eq!(out.lines().count(), 3);
        assert_eq!(err, "Invalid regex: [: unclosed character class\n");
        assert_eq!(outcome.failed, 1);
    }

    #[test]
    fn requested_fields_follow_options() {
        let source = table();
        let options = LookupOptions {
            fields: Fields {
                info: true,
                cmdline: false,
                environ: true,
            },
            ..LookupOptions::default()
        };
        run(&source, options, &["init"]);
        assert_eq!(
            source.requested.borrow().as_slice(),
            &[Fields {
                info: true,
                cmdline: false,
                environ: true
            }]
        );
    }

    #[test]
    fn unavailable_table_aborts() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = lookup(
            &BrokenSource,
            &LookupOptions::default(),
            &["bash".to_string()],
            &mut out,
            &mut err,
        );
        assert!(matches!(result, Err(ProcError::OpenTable(_))));
    }

    /// Accepts `budget` bytes, then behaves like a pipe whose reader exited.
    struct ClosedPipe {
        budget: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.budget == 0 {
                return Err(std::io::ErrorKind::BrokenPipe.into());
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_output_stops_quietly() {
        let options = LookupOptions {
            show_all: true,
            ..LookupOptions::default()
        };
        let mut out = ClosedPipe {
            budget: "init - pid=1\n".len(),
        };
        let mut err = Vec::new();
        let outcome = lookup(&table(), &options, &[], &mut out, &mut err).unwrap();
        assert_eq!(outcome, Outcome { matched: 1, failed: 0 });
        assert!(err.is_empty());
    }

    #[test]
    fn closed_output_skips_remaining_tokens() {
        let source = table();
        let tokens = vec!["bash".to_string(), "zsh".to_string()];
        let mut out = ClosedPipe { budget: 0 };
        let mut err = Vec::new();
        let outcome = lookup(&source, &LookupOptions::default(), &tokens, &mut out, &mut err)
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.matched, 0);
        assert!(err.is_empty());
        assert_eq!(source.opened.get(), 1);
    }

    #[test]
    fn other_write_errors_abort() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut err = Vec::new();
        let result = lookup(
            &table(),
            &LookupOptions::default(),
            &["init".to_string()],
            &mut Full,
            &mut err,
        );
        assert!(matches!(result, Err(ProcError::Io(_))));
    }
}
