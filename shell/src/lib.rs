//! A small interactive shell with a fixed table of built-in commands.
//!
//! Each line read from the user is split on whitespace by [`lexer`], the first word is
//! looked up in a [`table::CommandTable`], and the matching command runs against the
//! shell's [`env::Environment`]. Commands either do their work in-process or forward
//! the output of an external program.
//!
//! The main entry point is [`Interpreter`], which drives the read-dispatch loop over
//! any [`reader::LineReader`]. The public modules [`command`] and [`env`] expose the
//! traits and types commands are written against.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod reader;
pub mod table;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{DEFAULT_PROMPT, Interpreter, LoopState};
