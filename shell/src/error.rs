use rustyline::error::ReadlineError;
use std::io;
use std::time::Duration;

/// Errors surfaced by the dispatcher, the line readers and the external program runner.
///
/// Handler failures never leave the handler as a `ShellError`: they are reported on the
/// error stream and turned into an [`ExitCode`](crate::command::ExitCode) at the handler
/// boundary. The variants here are the ones callers of the library can observe.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The first token of a line does not name a registered command.
    #[error("{0}: not a command")]
    UnknownCommand(String),

    /// A command was invoked without the operands it requires.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// An external program could not be started.
    #[error("{program}: failed to start")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// An external program did not finish in time and was killed.
    #[error("{program}: timed out after {}s, terminated", .after.as_secs())]
    Timeout { program: String, after: Duration },

    /// The line editor failed for a reason other than end of input or Ctrl-C.
    #[error("failed to read input")]
    Readline(#[from] ReadlineError),

    #[error("I/O error")]
    Io(#[from] io::Error),
}
