use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use log::{debug, warn};
use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a child that already closed its output is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A diagnostic program whose output is forwarded to the console.
///
/// The program runs in the session's working directory with standard input
/// connected to `/dev/null`, so it can never swallow the shell's own input.
/// Its standard error is inherited and reaches the terminal directly.
pub struct ExternalProgram {
    program: &'static str,
    args: Vec<OsString>,
}

impl ExternalProgram {
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Run the program and copy every line of its output to `stdout`.
    pub fn run(&self, env: &Environment, stdout: &mut dyn Write) -> Result<ExitCode, ShellError> {
        self.run_filtered(env, stdout, |_, _| true)
    }

    /// Run the program and copy the lines for which `keep(line_number, line)` holds.
    ///
    /// Line numbers start at 0. Lines are forwarded as they arrive, terminator
    /// included. When `env.program_timeout` elapses first the child is killed and
    /// [`ShellError::Timeout`] is returned. The child is reaped on every path.
    pub fn run_filtered(
        &self,
        env: &Environment,
        stdout: &mut dyn Write,
        mut keep: impl FnMut(usize, &str) -> bool,
    ) -> Result<ExitCode, ShellError> {
        let child = Command::new(self.program)
            .args(&self.args)
            .current_dir(&env.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: self.program.to_string(),
                source,
            })?;
        let mut child = Reaper(child);
        debug!("spawned {} (pid {})", self.program, child.0.id());

        let deadline = env.program_timeout.map(|t| Instant::now() + t);
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let output = child.0.stdout.take();
        let pump = thread::spawn(move || {
            let Some(output) = output else { return };
            let mut output = BufReader::new(output);
            loop {
                let mut line = Vec::new();
                match output.read_until(b'\n', &mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let mut number = 0;
        loop {
            let line = match deadline {
                None => match rx.recv() {
                    Ok(line) => line,
                    Err(_) => break,
                },
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(remaining) {
                        Ok(line) => line,
                        Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(env)),
                    }
                }
            };
            if keep(number, &String::from_utf8_lossy(&line)) {
                stdout.write_all(&line)?;
            }
            number += 1;
        }
        stdout.flush()?;
        let _ = pump.join();

        let status = match deadline {
            None => child.0.wait()?,
            Some(deadline) => match wait_until(&mut child.0, deadline)? {
                Some(status) => status,
                None => return Err(self.timed_out(env)),
            },
        };
        debug!("{} exited with {}", self.program, status);
        Ok(status_code(status))
    }

    fn timed_out(&self, env: &Environment) -> ShellError {
        warn!("{} exceeded its time limit, killing it", self.program);
        ShellError::Timeout {
            program: self.program.to_string(),
            after: env.program_timeout.unwrap_or_default(),
        }
    }
}

/// Kills the child if it is still running and always waits for it, so no
/// zombie outlives the command that spawned it.
struct Reaper(Child);

impl Drop for Reaper {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
        }
        let _ = self.0.wait();
    }
}

fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn status_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
