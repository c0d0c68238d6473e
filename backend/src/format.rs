//! Text rendering of matched processes.

use crate::types::{Fields, ProcessInfo};
use std::fmt::Display;
use std::io::{self, Write};

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

pub fn write_entry<W: Write>(out: &mut W, info: &ProcessInfo, opts: &Fields) -> io::Result<()> {
    write!(out, "{} - pid={}", info.name, info.pid)?;
    if opts.info {
        write!(
            out,
            " ppid={} state={} uid={} gid={} priority={} nice={}",
            info.ppid,
            info.state,
            or_unknown(info.euid),
            or_unknown(info.egid),
            info.priority,
            info.nice
        )?;
    }
    writeln!(out)?;

    if opts.cmdline {
        write!(out, "cmdline:")?;
        match &info.cmdline {
            Some(args) => {
                writeln!(out)?;
                for (i, arg) in args.iter().enumerate() {
                    writeln!(out, "  {}: {}", i, arg)?;
                }
            }
            None => writeln!(out, " no permission")?,
        }
    }

    if opts.environ {
        write!(out, "environ:")?;
        match &info.environ {
            Some(vars) => {
                writeln!(out)?;
                for var in vars {
                    writeln!(out, "  {}", var)?;
                }
            }
            None => writeln!(out, " no permission")?,
        }
    }

    if opts.cmdline || opts.environ {
        writeln!(out)?;
    }
    Ok(())
}
