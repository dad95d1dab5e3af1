//! Filesystem commands: working directory, listing, creation, removal, renaming.

use super::{BuiltinCommand, for_each_operand};
use crate::command::{ExitCode, SUCCESS, Streams};
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::FromArgs;
use std::env;
use std::fs::{self, File, FileType, OpenOptions};
use std::io::{self, BufWriter, Write};

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "mpwd"
    }

    fn usage() -> &'static str {
        "mpwd"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        writeln!(streams.stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "mcd"
    }

    fn usage() -> &'static str {
        "mcd <directory>"
    }

    fn execute(self, _streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let new_dir = env.resolve(&self.target);

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("mcd: {}", self.target))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("mcd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// List the entries of the current working directory, one per line.
pub struct Ls {}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "mls"
    }

    fn usage() -> &'static str {
        "mls"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let entries = fs::read_dir(&env.current_dir).with_context(|| {
            format!("mls: cannot open directory {}", env.current_dir.display())
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.context("mls: cannot read directory entry")?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        for name in names {
            writeln!(streams.stdout, "{name}")?;
        }
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Create directories.
pub struct Mkdir {
    #[argh(positional, greedy)]
    /// directories to create; parents must already exist.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mmkdir"
    }

    fn usage() -> &'static str {
        "mmkdir <directory>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.dirs.is_empty() {
            return Err(Self::usage_error());
        }
        Ok(for_each_operand(&self.dirs, streams.stderr, |dir| {
            fs::create_dir(env.resolve(dir))
                .with_context(|| format!("mmkdir: cannot create directory '{dir}'"))
        }))
    }
}

#[derive(FromArgs)]
/// Remove empty directories.
pub struct Rmdir {
    #[argh(positional, greedy)]
    /// directories to remove; each must be empty.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Rmdir {
    fn name() -> &'static str {
        "mrmdir"
    }

    fn usage() -> &'static str {
        "mrmdir <directory>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.dirs.is_empty() {
            return Err(Self::usage_error());
        }
        Ok(for_each_operand(&self.dirs, streams.stderr, |dir| {
            fs::remove_dir(env.resolve(dir))
                .with_context(|| format!("mrmdir: cannot remove '{dir}'"))
        }))
    }
}

#[derive(FromArgs)]
/// Remove files.
pub struct Rm {
    #[argh(positional, greedy)]
    /// files to remove.
    pub files: Vec<String>,
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "mrm"
    }

    fn usage() -> &'static str {
        "mrm <file>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.files.is_empty() {
            return Err(Self::usage_error());
        }
        Ok(for_each_operand(&self.files, streams.stderr, |file| {
            fs::remove_file(env.resolve(file))
                .with_context(|| format!("mrm: cannot remove '{file}'"))
        }))
    }
}

#[derive(FromArgs)]
/// Create empty files. Existing files are reported and left untouched.
pub struct Touch {
    #[argh(positional, greedy)]
    /// files to create.
    pub files: Vec<String>,
}

impl BuiltinCommand for Touch {
    fn name() -> &'static str {
        "mtouch"
    }

    fn usage() -> &'static str {
        "mtouch <file>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.files.is_empty() {
            return Err(Self::usage_error());
        }
        Ok(for_each_operand(&self.files, streams.stderr, |file| {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(env.resolve(file))
                .map(drop)
                .with_context(|| format!("mtouch: cannot create '{file}'"))
        }))
    }
}

#[derive(FromArgs)]
/// Describe the type of each file.
pub struct FileKind {
    #[argh(positional, greedy)]
    /// files to inspect; symbolic links are described, not followed.
    pub files: Vec<String>,
}

impl BuiltinCommand for FileKind {
    fn name() -> &'static str {
        "mfile"
    }

    fn usage() -> &'static str {
        "mfile <file>..."
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if self.files.is_empty() {
            return Err(Self::usage_error());
        }
        let stdout = &mut *streams.stdout;
        Ok(for_each_operand(&self.files, streams.stderr, |file| {
            let meta = fs::symlink_metadata(env.resolve(file))
                .with_context(|| format!("mfile: cannot stat '{file}'"))?;
            writeln!(stdout, "{file}: {}", describe(meta.file_type()))?;
            Ok(())
        }))
    }
}

fn describe(kind: FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if kind.is_symlink() {
        "symbolic link"
    } else if kind.is_dir() {
        "directory"
    } else if kind.is_file() {
        "regular file"
    } else if kind.is_fifo() {
        "fifo"
    } else if kind.is_socket() {
        "socket"
    } else if kind.is_block_device() {
        "block device"
    } else if kind.is_char_device() {
        "character device"
    } else {
        "unknown file type"
    }
}

#[derive(FromArgs)]
/// Rename a file.
pub struct Rename {
    #[argh(positional)]
    /// current name of the file.
    pub from: String,

    #[argh(positional)]
    /// new name; an existing file with this name is replaced.
    pub to: String,
}

impl BuiltinCommand for Rename {
    fn name() -> &'static str {
        "mrename"
    }

    fn usage() -> &'static str {
        "mrename <old_filename> <new_filename>"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        fs::rename(env.resolve(&self.from), env.resolve(&self.to)).with_context(|| {
            format!("mrename: cannot rename '{}' to '{}'", self.from, self.to)
        })?;
        writeln!(streams.stdout, "File renamed successfully.")?;
        Ok(SUCCESS)
    }
}

#[derive(FromArgs)]
/// Overwrite a file with the lines typed after this command, up to end of input.
pub struct Edit {
    #[argh(positional)]
    /// file to overwrite; created when missing.
    pub file: String,
}

impl BuiltinCommand for Edit {
    fn name() -> &'static str {
        "medit"
    }

    fn usage() -> &'static str {
        "medit <filename>"
    }

    fn execute(self, streams: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        let file = File::create(env.resolve(&self.file))
            .with_context(|| format!("medit: cannot open '{}'", self.file))?;
        let mut file = BufWriter::new(file);

        writeln!(streams.stdout, "Enter the content (press Ctrl+D to finish):")?;
        streams.stdout.flush()?;

        io::copy(&mut *streams.stdin, &mut file)
            .with_context(|| format!("medit: cannot write '{}'", self.file))?;
        file.flush()
            .with_context(|| format!("medit: cannot write '{}'", self.file))?;

        writeln!(streams.stdout, "File edited successfully.")?;
        Ok(SUCCESS)
    }
}
