use crate::env::Environment;
use std::io::{BufRead, Write};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Status of a command that completed normally.
pub const SUCCESS: ExitCode = 0;
/// Status of a command whose operation failed.
pub const FAILURE: ExitCode = 1;
/// Status of a command invoked with missing or malformed arguments.
pub const USAGE: ExitCode = 2;
/// Status reported for a line whose command name is not registered.
pub const NOT_FOUND: ExitCode = 127;

/// The console a command talks to.
///
/// `stdin` is the same stream the loop reads command lines from, so a command that
/// consumes input (e.g. `medit`) sees the lines that follow its own.
pub struct Streams<'a> {
    pub stdin: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl<'a> Streams<'a> {
    pub fn new(
        stdin: &'a mut dyn BufRead,
        stdout: &'a mut dyn Write,
        stderr: &'a mut dyn Write,
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// Implemented by built-ins via a blanket impl. Execution never fails from the
/// caller's point of view: the command reports its own errors on `streams.stderr`
/// and returns a status.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(self: Box<Self>, streams: &mut Streams<'_>, env: &mut Environment) -> ExitCode;
}

/// Factory that creates a command from its arguments.
///
/// One factory is registered per command name in the
/// [`CommandTable`](crate::table::CommandTable). Factories are stateless, so the table
/// can be shared process-wide.
pub trait CommandFactory: Send + Sync {
    /// The literal name the command is registered under.
    fn name(&self) -> &'static str;

    /// One-line usage synopsis, e.g. `mcd <directory>`.
    fn usage(&self) -> &'static str;

    /// Build a command instance for the provided arguments (the tokens after the name).
    ///
    /// Malformed arguments still yield a command: one that prints the diagnostic.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
