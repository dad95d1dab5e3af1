//! Line acquisition for the interactive loop.

use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, StdinLock, Write};

/// Source of command lines.
///
/// `read_line` returns `Ok(None)` once the input is exhausted, which is how the loop
/// tells end of input apart from an empty line.
pub trait LineReader {
    /// Show `prompt`, then block until a full line (terminator stripped) or end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError>;

    /// The stream lines are read from, for commands that consume further input.
    fn input(&mut self) -> &mut dyn BufRead;
}

/// Interactive reader with line editing and in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
    stdin: StdinLock<'static>,
}

impl EditorReader {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            stdin: io::stdin().lock(),
        })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn input(&mut self) -> &mut dyn BufRead {
        &mut self.stdin
    }
}

/// Plain buffered reader, used when input is not a terminal.
///
/// The prompt goes to `prompt_out`, which is flushed before every read.
pub struct StreamReader<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> StreamReader<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.prompt_out)
    }
}

impl<R: BufRead, W: Write> LineReader for StreamReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        self.prompt_out.write_all(prompt.as_bytes())?;
        self.prompt_out.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        strip_terminator(&mut raw);
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    fn input(&mut self) -> &mut dyn BufRead {
        &mut self.input
    }
}

fn strip_terminator(raw: &mut Vec<u8>) {
    if raw.last() == Some(&b'\n') {
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
    }
}
