//! Commands that forward the output of an external diagnostic program.

use super::{BuiltinCommand, for_each_operand};
use crate::command::{ExitCode, Streams};
use crate::env::Environment;
use crate::external::ExternalProgram;
use anyhow::{Context, Result};
use argh::FromArgs;
use regex::Regex;

/// Declares a zero-argument command that runs one fixed program line.
macro_rules! forwarding_command {
    ($ty:ident, $name:literal, $help:literal, $program:literal $(, $arg:literal)* $(,)?) => {
        #[derive(FromArgs)]
        #[doc = $help]
        pub struct $ty {}

        impl BuiltinCommand for $ty {
            fn name() -> &'static str {
                $name
            }

            fn usage() -> &'static str {
                $name
            }

            fn execute(
                self,
                streams: &mut Streams<'_>,
                env: &mut Environment,
            ) -> Result<ExitCode> {
                Ok(ExternalProgram::new($program)
                    $(.arg($arg))*
                    .run(env, streams.stdout)?)
            }
        }
    };
}

forwarding_command!(Ps, "mps", "List every process on the system.", "ps", "-ef");
forwarding_command!(
    Netstat,
    "mnetstat",
    "List listening TCP and UDP sockets.",
    "netstat",
    "-tuln"
);
forwarding_command!(Top, "mtop", "Print one snapshot of resource usage.", "top", "-b", "-n", "1");
forwarding_command!(Ifconfig, "mifconfig", "Summarise network interfaces.", "ifconfig");
forwarding_command!(Who, "mwho", "List logged-in users.", "who");
forwarding_command!(Cal, "mcal", "Print a calendar of the current month.", "cal");
forwarding_command!(Shutdown, "mshutdown", "Power off the machine now.", "shutdown", "-h", "now");
forwarding_command!(Restart, "mrestart", "Reboot the machine now.", "shutdown", "-r", "now");

#[derive(FromArgs)]
/// Search the current directory tree for regular files with the given names.
pub struct Locate {
    #[argh(positional, greedy)]
    /// file names (or `find -name` patterns) to look for.
    pub names: Vec<String>,
}

impl BuiltinCommand for Locate {
    fn name() -> &'static str {
        "mlocate"
    }

    fn usage() -> &'static str {
        "mlocate <file_name>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.names.is_empty() {
            return Err(Self::usage_error());
        }
        let stdout = &mut *streams.stdout;
        Ok(for_each_operand(&self.names, streams.stderr, |name| {
            ExternalProgram::new("find")
                .args([".", "-name", name, "-type", "f"])
                .run(env, stdout)?;
            Ok(())
        }))
    }
}

#[derive(FromArgs)]
/// Send four ICMP echo requests to a host.
pub struct Ping {
    #[argh(positional)]
    /// host name or address to probe.
    pub host: String,
}

impl BuiltinCommand for Ping {
    fn name() -> &'static str {
        "mping"
    }

    fn usage() -> &'static str {
        "mping <hostname>"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        Ok(ExternalProgram::new("ping")
            .args(["-c", "4", self.host.as_str()])
            .run(env, streams.stdout)?)
    }
}

#[derive(FromArgs)]
/// List the processes running this shell.
pub struct Jobs {}

impl BuiltinCommand for Jobs {
    fn name() -> &'static str {
        "mjobs"
    }

    fn usage() -> &'static str {
        "mjobs"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let pattern = program_pattern(&own_program_name())?;
        writeln!(streams.stdout, "List of background processes:")?;
        // Row 0 is the `ps` column header.
        Ok(ExternalProgram::new("ps")
            .arg("-ef")
            .run_filtered(env, streams.stdout, |row, line| {
                row == 0 || pattern.is_match(line)
            })?)
    }
}

fn own_program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "mshell".to_string())
}

/// Matches a `ps -ef` row whose command is `program`, run by bare name or by path.
fn program_pattern(program: &str) -> Result<Regex> {
    let pattern = format!(r"(^|[\s/]){}(\s|$)", regex::escape(program));
    Regex::new(&pattern).with_context(|| format!("mjobs: invalid process pattern {pattern}"))
}
