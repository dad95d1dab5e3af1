use std::env as stdenv;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-session state shared by the loop and every command.
///
/// The environment contains:
/// - `current_dir`: the working directory relative paths are resolved against.
/// - `should_exit`: a flag the interactive loop checks after each command.
/// - `program_timeout`: how long an external program may run before it is killed.
///
/// `mcd` keeps `current_dir` and the real process working directory in step, so
/// handlers may rely on either.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Upper bound on an external program's runtime. `None` waits forever.
    pub program_timeout: Option<Duration>,
}

impl Environment {
    /// Capture the current process working directory into a new `Environment`.
    ///
    /// Falls back to `.` when the working directory cannot be determined
    /// (e.g. it was removed underneath the process).
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    /// Environment rooted at `dir` without touching the process working directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: dir.into(),
            should_exit: false,
            program_timeout: None,
        }
    }

    pub fn with_program_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.program_timeout = timeout;
        self
    }

    /// Resolve a user-supplied path against `current_dir`.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::env as stdenv;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_env_resolves_relative_against_current_dir() {
        let env = Environment::at("/srv/data");
        assert_eq!(env.resolve("notes.txt"), Path::new("/srv/data/notes.txt"));
        assert_eq!(env.resolve("../x"), Path::new("/srv/data/../x"));
    }

    #[test]
    fn test_env_keeps_absolute_paths() {
        let env = Environment::at("/srv/data");
        assert_eq!(env.resolve("/etc/hosts"), Path::new("/etc/hosts"));
    }

    #[test]
    fn test_env_reads_from_process_cwd() {
        let _lock = crate::test_support::lock_current_dir();
        let env = Environment::new();
        assert_eq!(env.current_dir, stdenv::current_dir().unwrap());
        assert!(!env.should_exit);
        assert_eq!(env.program_timeout, None);
    }

    #[test]
    fn test_env_with_program_timeout() {
        let env = Environment::at("/").with_program_timeout(Some(Duration::from_secs(3)));
        assert_eq!(env.program_timeout, Some(Duration::from_secs(3)));
    }
}
