//! Built-in commands known to the shell at compile time.

mod diagnostics;
mod files;
mod system;

pub(crate) use diagnostics::*;
pub(crate) use files::*;
pub(crate) use system::*;

use crate::command::{
    CommandFactory, ExecutableCommand, ExitCode, FAILURE, SUCCESS, Streams, USAGE,
};
use crate::env::Environment;
use crate::error::ShellError;
use crate::table::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process; the ones that need an external program go through
/// [`ExternalProgram`](crate::external::ExternalProgram).
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "mecho" or "mcd".
    fn name() -> &'static str;

    /// Synopsis printed after argument errors, e.g. "mcd <directory>".
    fn usage() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    /// An `Err` is reported on `streams.stderr` by the caller.
    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode>;

    fn usage_error() -> anyhow::Error {
        ShellError::Usage(Self::usage()).into()
    }
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, streams: &mut Streams<'_>, env: &mut Environment) -> ExitCode {
        match <T as BuiltinCommand>::execute(*self, streams, env) {
            Ok(code) => code,
            Err(e) => report(streams.stderr, &e),
        }
    }
}

/// Print `err` the way every command reports failures and return the matching status.
///
/// Usage errors are printed as-is; everything else gets the `mshell:` prefix followed
/// by the whole context chain, e.g. `mshell: mrmdir: cannot remove 'x': Directory not
/// empty (os error 39)`.
pub(crate) fn report(stderr: &mut dyn Write, err: &anyhow::Error) -> ExitCode {
    // Nothing sensible is left to do if the error stream itself is broken.
    match err.downcast_ref::<ShellError>() {
        Some(usage @ ShellError::Usage(_)) => {
            let _ = writeln!(stderr, "{usage}");
            USAGE
        }
        _ => {
            let _ = writeln!(stderr, "mshell: {err:#}");
            FAILURE
        }
    }
}

/// Apply `op` to every operand, reporting each failure and carrying on with the rest.
fn for_each_operand(
    operands: &[String],
    stderr: &mut dyn Write,
    mut op: impl FnMut(&str) -> Result<()>,
) -> ExitCode {
    let mut status = SUCCESS;
    for operand in operands {
        if let Err(e) = op(operand) {
            status = report(stderr, &e);
        }
    }
    status
}

/// Command produced when argh rejects the operands or answers a lone `--help`.
struct InvalidArgs {
    output: String,
    usage: &'static str,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, streams: &mut Streams<'_>, _env: &mut Environment) -> ExitCode {
        if !self.is_error {
            let _ = writeln!(streams.stdout, "{}", self.output.trim_end());
            return SUCCESS;
        }
        let _ = writeln!(streams.stderr, "{}", self.output.trim_end());
        let _ = writeln!(streams.stderr, "usage: {}", self.usage);
        USAGE
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn usage(&self) -> &'static str {
        T::usage()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        // A lone `--help` asks for help; everything else is an operand, even when it
        // starts with `-` or reads `help`.
        let parsed = if args == ["--help"] {
            T::from_args(&[T::name()], args)
        } else {
            let operands: Vec<&str> = std::iter::once("--").chain(args.iter().copied()).collect();
            T::from_args(&[T::name()], &operands)
        };
        match parsed {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                usage: T::usage(),
                is_error: status.is_err(),
            }),
        }
    }
}
