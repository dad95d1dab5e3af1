//! Session and host information commands.

use super::BuiltinCommand;
use crate::command::{ExitCode, SUCCESS, Streams};
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::FromArgs;
use chrono::{DateTime as LocalDateTime, Local};
use std::ffi::CString;
use std::io::{self, Write};
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

#[derive(FromArgs)]
/// Write the arguments to standard output, separated by spaces.
pub struct Echo {
    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "mecho"
    }

    fn usage() -> &'static str {
        "mecho [word...]"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(streams.stdout, "{}", self.args.join(" "))?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Clear the terminal screen.
pub struct Clear {}

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "mclear"
    }

    fn usage() -> &'static str {
        "mclear"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        // Cursor home, then erase to the end of the screen.
        write!(streams.stdout, "\x1b[H\x1b[J")?;
        streams.stdout.flush()?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "mexit"
    }

    fn usage() -> &'static str {
        "mexit"
    }

    fn execute(self, _streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Print the operating system name, release, version and machine type.
pub struct Uname {}

impl BuiltinCommand for Uname {
    fn name() -> &'static str {
        "muname"
    }

    fn usage() -> &'static str {
        "muname"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        let mut uts = MaybeUninit::<libc::utsname>::uninit();
        // SAFETY: `uts` is valid for writes of one `utsname`, which `uname` fills on success.
        if unsafe { libc::uname(uts.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error()).context("muname");
        }
        // SAFETY: `uname` returned 0, so every field is initialised and NUL-terminated.
        let uts = unsafe { uts.assume_init() };

        for field in [&uts.sysname[..], &uts.release[..], &uts.version[..], &uts.machine[..]] {
            writeln!(streams.stdout, "{}", c_field(field))?;
        }
        Ok(SUCCESS)
    }
}

fn c_field(raw: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[derive(FromArgs)]
/// Print the name of this host.
pub struct Hostname {}

impl BuiltinCommand for Hostname {
    fn name() -> &'static str {
        "mhostname"
    }

    fn usage() -> &'static str {
        "mhostname"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        let name = hostname::get().context("mhostname")?;
        writeln!(streams.stdout, "Hostname: {}", name.to_string_lossy())?;
        Ok(SUCCESS)
    }
}

fn write_time(out: &mut dyn Write, now: &LocalDateTime<Local>) -> io::Result<()> {
    writeln!(out, "Current time: {}", now.format("%H:%M:%S"))
}

fn write_date(out: &mut dyn Write, now: &LocalDateTime<Local>) -> io::Result<()> {
    writeln!(out, "Current date: {}", now.format("%Y-%m-%d"))
}

#[derive(FromArgs)]
/// Print the local time of day.
pub struct Time {}

impl BuiltinCommand for Time {
    fn name() -> &'static str {
        "mtime"
    }

    fn usage() -> &'static str {
        "mtime"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        write_time(streams.stdout, &Local::now())?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Print the local date.
pub struct Date {}

impl BuiltinCommand for Date {
    // Registered as `ndate`, the name the command has always answered to.
    fn name() -> &'static str {
        "ndate"
    }

    fn usage() -> &'static str {
        "ndate"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        write_date(streams.stdout, &Local::now())?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Print the local date, then the local time.
pub struct DateTime {}

impl BuiltinCommand for DateTime {
    fn name() -> &'static str {
        "datetime"
    }

    fn usage() -> &'static str {
        "datetime"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        let now = Local::now();
        write_date(streams.stdout, &now)?;
        write_time(streams.stdout, &now)?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Ask a process to terminate by sending it SIGTERM.
pub struct Kill {
    #[argh(positional)]
    /// id of the process to terminate; must be positive.
    pub pid: i32,
}

impl BuiltinCommand for Kill {
    fn name() -> &'static str {
        "mkill"
    }

    fn usage() -> &'static str {
        "mkill <pid>"
    }

    fn execute(self, streams: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        // 0 and negative ids address whole process groups.
        if self.pid <= 0 {
            return Err(Self::usage_error());
        }
        // SAFETY: kill(2) takes plain integers and has no memory-safety preconditions.
        if unsafe { libc::kill(self.pid, libc::SIGTERM) } != 0 {
            return Err(io::Error::last_os_error()).with_context(|| format!("mkill: ({})", self.pid));
        }
        writeln!(streams.stdout, "Process with PID {} killed", self.pid)?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Report the size of the filesystem holding the current directory.
pub struct Df {}

impl BuiltinCommand for Df {
    fn name() -> &'static str {
        "mdf"
    }

    fn usage() -> &'static str {
        "mdf"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let usage = DiskUsage::of(&env.current_dir)
            .with_context(|| format!("mdf: {}", env.current_dir.display()))?;
        writeln!(streams.stdout, "Total size: {} bytes", usage.total)?;
        writeln!(streams.stdout, "Free size: {} bytes", usage.free)?;
        writeln!(streams.stdout, "Available size: {} bytes", usage.available)?;
        Ok(SUCCESS)
    }
}

/// Byte counts reported by `statvfs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DiskUsage {
    total: u64,
    free: u64,
    /// Free space usable by unprivileged users.
    available: u64,
}

impl DiskUsage {
    fn of(path: &Path) -> io::Result<Self> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut stat = MaybeUninit::<libc::statvfs>::uninit();
        // SAFETY: `c_path` is NUL-terminated and `stat` is valid for writes of one `statvfs`.
        if unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `statvfs` returned 0 and filled the struct.
        let stat = unsafe { stat.assume_init() };

        let block = stat.f_frsize as u64;
        Ok(Self {
            total: stat.f_blocks as u64 * block,
            free: stat.f_bfree as u64 * block,
            available: stat.f_bavail as u64 * block,
        })
    }
}
