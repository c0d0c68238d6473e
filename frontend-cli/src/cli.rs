//! Command-line flags.

use clap::Parser;
use procfind::{Fields, LookupOptions, ModeOverride};

#[derive(Parser, Debug)]
#[command(
    name = "procfind",
    version,
    about = "Look up running processes by name or ID",
    override_usage = "procfind [OPTIONS] <process name/ID>...",
    after_help = "EXAMPLES:
    procfind sshd              # Exact name match
    procfind 1                 # Match by PID
    procfind -s work           # Names containing 'work'
    procfind -r '^k.*d$'       # Names matching a regex
    procfind -ci 1234          # PID 1234 with cmdline and extra info
    procfind -a                # Every process"
)]
pub struct Cli {
    /// Show all processes
    #[arg(short, long, conflicts_with_all = ["name", "pid", "substring", "regex", "targets"])]
    pub all: bool,

    /// Force match by process name
    #[arg(short, long, conflicts_with_all = ["pid", "substring", "regex"])]
    pub name: bool,

    /// Force match by process ID
    #[arg(short, long, conflicts_with_all = ["substring", "regex"])]
    pub pid: bool,

    /// Match process names containing the argument
    #[arg(short, long, conflicts_with = "regex")]
    pub substring: bool,

    /// Match process names against the argument as a regular expression
    #[arg(short, long)]
    pub regex: bool,

    /// Show command line arguments
    #[arg(short, long)]
    pub cmdline: bool,

    /// Show environment variables
    #[arg(short, long)]
    pub environ: bool,

    /// Show extra info (ppid, state, uid, gid, priority, nice)
    #[arg(short, long)]
    pub info: bool,

    /// Process names, IDs, substrings or patterns to look up
    #[arg(value_name = "process name/ID", required_unless_present = "all")]
    pub targets: Vec<String>,
}

impl Cli {
    pub fn mode(&self) -> ModeOverride {
        if self.name {
            ModeOverride::Name
        } else if self.pid {
            ModeOverride::Pid
        } else if self.substring {
            ModeOverride::Substring
        } else if self.regex {
            ModeOverride::Regex
        } else {
            ModeOverride::Auto
        }
    }

    pub fn options(&self) -> LookupOptions {
        LookupOptions {
            show_all: self.all,
            mode: self.mode(),
            fields: Fields {
                info: self.info,
                cmdline: self.cmdline,
                environ: self.environ,
            },
        }
    }
}
