use crate::command::{ExitCode, NOT_FOUND, SUCCESS, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer;
use crate::reader::LineReader;
use crate::table::CommandTable;
use log::debug;
use std::io::Write;

/// Default prompt shown before each line of input.
pub const DEFAULT_PROMPT: &str = "shell> ";

/// Where the interactive loop stands after a step.
///
/// Tokenizing and dispatching happen inside a single [`Interpreter::step`], so only
/// the two states a caller can observe between steps are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Ready to read the next line.
    AwaitingInput,
    /// The exit command ran or the input ended. Terminal.
    Exited,
}

/// A minimal shell-like interpreter that executes built-in commands.
///
/// The interpreter maintains an [`Environment`] and a read-only [`CommandTable`]
/// that command names are resolved against. See [`Default`] for the table used
/// out of the box.
///
/// Example
/// ```
/// use mshell::Interpreter;
/// use mshell::command::Streams;
///
/// let mut sh = Interpreter::default();
/// let (mut input, mut out, mut err) = (std::io::empty(), Vec::new(), Vec::new());
/// let mut streams = Streams::new(&mut input, &mut out, &mut err);
/// let code = sh.execute_line("mecho hello world", &mut streams);
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    table: &'static CommandTable,
    prompt: String,
}

impl Interpreter {
    /// Create a new interpreter over `table`, starting in `env`.
    pub fn new(table: &'static CommandTable, env: Environment) -> Self {
        Self {
            env,
            table,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code, or [`ShellError::UnknownCommand`] if no
    /// command is registered under `name`.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        streams: &mut Streams<'_>,
    ) -> Result<ExitCode, ShellError> {
        let factory = self
            .table
            .resolve(name)
            .ok_or_else(|| ShellError::UnknownCommand(name.to_string()))?;
        debug!("dispatching {} with {} argument(s)", name, args.len());
        let code = factory.create(args).execute(streams, &mut self.env);
        debug!("{} finished with status {}", name, code);
        Ok(code)
    }

    /// Tokenize `line` and dispatch it.
    ///
    /// Blank lines are skipped without output. An unknown command name is reported
    /// on `streams.stderr` and yields [`NOT_FOUND`]; it never stops the loop.
    pub fn execute_line(&mut self, line: &str, streams: &mut Streams<'_>) -> ExitCode {
        let argv = lexer::tokenize(line);
        let Some(name) = argv.command() else {
            return SUCCESS;
        };

        match self.run(name, argv.args(), streams) {
            Ok(code) => code,
            Err(e) => {
                let _ = writeln!(streams.stderr, "mshell: {e}");
                NOT_FOUND
            }
        }
    }

    /// Read one line from `reader` and execute it.
    ///
    /// Returns [`LoopState::Exited`] when the input is exhausted or the executed
    /// command asked the shell to exit.
    pub fn step(
        &mut self,
        reader: &mut dyn LineReader,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<LoopState, ShellError> {
        let Some(line) = reader.read_line(&self.prompt)? else {
            debug!("end of input");
            return Ok(LoopState::Exited);
        };

        let mut streams = Streams::new(reader.input(), stdout, stderr);
        self.execute_line(&line, &mut streams);
        streams.stdout.flush()?;

        if self.env.should_exit {
            Ok(LoopState::Exited)
        } else {
            Ok(LoopState::AwaitingInput)
        }
    }

    /// The Read-Eval-Print Loop: step until the shell exits.
    pub fn repl(
        &mut self,
        reader: &mut dyn LineReader,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), ShellError> {
        while self.step(reader, stdout, stderr)? == LoopState::AwaitingInput {}
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter over [`CommandTable::builtins`] in the process
    /// working directory.
    fn default() -> Self {
        Self::new(CommandTable::builtins(), Environment::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::command::{FAILURE, NOT_FOUND, SUCCESS, Streams, USAGE};
    use crate::env::Environment;
    use crate::interpreter::{Interpreter, LoopState};
    use crate::reader::StreamReader;
    use crate::table::CommandTable;
    use std::fs;
    use std::io::Cursor;

    fn scratch() -> (tempfile::TempDir, Interpreter) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = fs::canonicalize(dir.path()).expect("canonicalize");
        let sh = Interpreter::new(CommandTable::builtins(), Environment::at(root));
        (dir, sh)
    }

    fn exec(sh: &mut Interpreter, line: &str) -> (i32, String, String) {
        let mut input = std::io::empty();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = {
            let mut streams = Streams::new(&mut input, &mut out, &mut err);
            sh.execute_line(line, &mut streams)
        };
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    /// Drive the whole loop over `input`; returns (prompts, stdout, stderr).
    fn session(sh: &mut Interpreter, input: &str) -> (String, String, String) {
        let mut reader = StreamReader::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.repl(&mut reader, &mut out, &mut err).expect("repl");
        let (_, prompts) = reader.into_parts();
        (
            String::from_utf8(prompts).unwrap(),
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_blank_lines_are_skipped_silently() {
        let (_dir, mut sh) = scratch();
        for line in ["", "   ", "\t", " \t \n"] {
            let (code, out, err) = exec(&mut sh, line);
            assert_eq!(code, SUCCESS);
            assert!(out.is_empty() && err.is_empty(), "line {line:?}");
        }
    }

    #[test]
    fn test_unknown_command_is_reported_and_not_fatal() {
        let (_dir, mut sh) = scratch();
        let (code, out, err) = exec(&mut sh, "frobnicate --now");
        assert_eq!(code, NOT_FOUND);
        assert!(out.is_empty());
        assert_eq!(err, "mshell: frobnicate: not a command\n");
        assert!(!sh.env().should_exit);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let (_dir, mut sh) = scratch();
        let (code, _, err) = exec(&mut sh, "MPWD");
        assert_eq!(code, NOT_FOUND);
        assert_eq!(err, "mshell: MPWD: not a command\n");
    }

    #[test]
    fn test_run_reports_unknown_names_as_errors() {
        let (_dir, mut sh) = scratch();
        let mut input = std::io::empty();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut streams = Streams::new(&mut input, &mut out, &mut err);
        let res = sh.run("mpw", &[], &mut streams);
        assert!(matches!(res, Err(crate::error::ShellError::UnknownCommand(n)) if n == "mpw"));
    }

    #[test]
    fn test_dispatch_passes_arguments_after_the_name() {
        let (_dir, mut sh) = scratch();
        let (code, out, _) = exec(&mut sh, "  mecho \t a   b  ");
        assert_eq!(code, SUCCESS);
        assert_eq!(out, "a b\n");
    }

    #[test]
    fn test_every_command_missing_arguments_has_no_side_effect() {
        let (dir, mut sh) = scratch();
        let before = fs::read_dir(dir.path()).unwrap().count();
        for line in [
            "mcd", "mmkdir", "mrmdir", "mrm", "mtouch", "mlocate", "mfile", "mkill", "mping",
            "mrename", "mrename only_one", "medit",
        ] {
            let (code, out, err) = exec(&mut sh, line);
            assert_eq!(code, USAGE, "{line}");
            assert!(out.is_empty(), "{line}: {out}");
            assert!(err.contains("usage: "), "{line}: {err}");
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), before);
        assert_eq!(sh.env().current_dir, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_failures_do_not_stop_later_commands() {
        let (_dir, mut sh) = scratch();
        let (code, _, _) = exec(&mut sh, "mrm ghost");
        assert_eq!(code, FAILURE);
        let (code, _, _) = exec(&mut sh, "mtouch after");
        assert_eq!(code, SUCCESS);
        assert!(sh.env().resolve("after").exists());
    }

    #[test]
    fn test_mkdir_then_rmdir_round_trip() {
        let (dir, mut sh) = scratch();
        exec(&mut sh, "mmkdir fresh");
        assert!(dir.path().join("fresh").is_dir());
        exec(&mut sh, "mrmdir fresh");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cd_is_seen_by_later_commands() {
        let _lock = crate::test_support::lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let (dir, mut sh) = scratch();

        exec(&mut sh, "mmkdir inner");
        let (code, _, err) = exec(&mut sh, "mcd inner");
        assert_eq!(code, SUCCESS, "{err}");
        exec(&mut sh, "mtouch here");
        let (_, pwd, _) = exec(&mut sh, "mpwd");

        let inner = fs::canonicalize(dir.path().join("inner")).unwrap();
        assert_eq!(pwd, format!("{}\n", inner.display()));
        assert!(inner.join("here").exists());

        std::env::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_exit_stops_the_loop_without_another_prompt() {
        let (_dir, mut sh) = scratch();
        let (prompts, out, err) = session(&mut sh, "mecho one\nmexit\nmecho two\n");
        assert_eq!(prompts, "shell> shell> ");
        assert_eq!(out, "one\n");
        assert!(err.is_empty());
        assert!(sh.env().should_exit);
    }

    #[test]
    fn test_end_of_input_ends_the_loop() {
        let (_dir, mut sh) = scratch();
        let (prompts, out, _) = session(&mut sh, "mecho one\n\n");
        assert_eq!(prompts, "shell> shell> shell> ");
        assert_eq!(out, "one\n");
        assert!(!sh.env().should_exit);
    }

    #[test]
    fn test_step_reports_state_transitions() {
        let (_dir, mut sh) = scratch();
        let mut reader = StreamReader::new(Cursor::new(b"mpwd\nmexit\n".to_vec()), Vec::new());
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(
            sh.step(&mut reader, &mut out, &mut err).unwrap(),
            LoopState::AwaitingInput
        );
        assert_eq!(
            sh.step(&mut reader, &mut out, &mut err).unwrap(),
            LoopState::Exited
        );
    }

    #[test]
    fn test_custom_prompt_is_used() {
        let (_dir, sh) = scratch();
        let mut sh = sh.with_prompt("$ ");
        let (prompts, _, _) = session(&mut sh, "mexit\n");
        assert_eq!(prompts, "$ ");
    }

    #[test]
    fn test_edit_consumes_following_lines_as_content() {
        let (dir, mut sh) = scratch();
        let (_, out, _) = session(&mut sh, "medit notes.txt\nmexit\nsecond line\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "mexit\nsecond line\n"
        );
        assert!(out.ends_with("File edited successfully.\n"));
        assert!(!sh.env().should_exit);
    }

    #[test]
    fn test_many_arguments_reach_the_handler() {
        let (_dir, mut sh) = scratch();
        let words: Vec<String> = (0..200).map(|i| i.to_string()).collect();
        let (_, out, _) = exec(&mut sh, &format!("mecho {}", words.join(" ")));
        assert_eq!(out, format!("{}\n", words.join(" ")));
    }

    #[test]
    fn test_operands_are_passed_through_unchanged() {
        let (_dir, mut sh) = scratch();
        let (code, out, err) = exec(&mut sh, "mecho help");
        assert_eq!((code, out.as_str()), (SUCCESS, "help\n"), "{err}");
        let (code, out, err) = exec(&mut sh, "mecho -n hello");
        assert_eq!((code, out.as_str()), (SUCCESS, "-n hello\n"), "{err}");
    }

    #[test]
    fn test_file_operands_may_look_like_flags() {
        let (dir, mut sh) = scratch();
        fs::write(dir.path().join("-x"), "").unwrap();
        let (code, _, err) = exec(&mut sh, "mrm -x");
        assert_eq!(code, SUCCESS, "{err}");
        assert!(!dir.path().join("-x").exists());

        let (code, _, err) = exec(&mut sh, "mtouch help --verbose");
        assert_eq!(code, SUCCESS, "{err}");
        assert!(dir.path().join("help").is_file());
        assert!(dir.path().join("--verbose").is_file());

        let (code, _, err) = exec(&mut sh, "mmkdir -d");
        assert_eq!(code, SUCCESS, "{err}");
        assert!(dir.path().join("-d").is_dir());
    }

    #[test]
    fn test_exit_ignores_flag_like_arguments() {
        let (_dir, mut sh) = scratch();
        let (code, _, err) = exec(&mut sh, "mexit --now");
        assert_eq!(code, SUCCESS, "{err}");
        assert!(sh.env().should_exit);
    }

    #[test]
    fn test_negative_pid_is_a_usage_error() {
        let (_dir, mut sh) = scratch();
        let (code, out, err) = exec(&mut sh, "mkill -1");
        assert_eq!(code, USAGE);
        assert!(out.is_empty());
        assert_eq!(err, "usage: mkill <pid>\n");
    }

    #[test]
    fn test_lone_help_flag_prints_help() {
        let (_dir, mut sh) = scratch();
        let (code, out, err) = exec(&mut sh, "mrename --help");
        assert_eq!(code, SUCCESS);
        assert!(out.contains("mrename"), "{out}");
        assert!(err.is_empty());
    }
}

