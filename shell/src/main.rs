use anyhow::Context;
use log::debug;
use mshell::Interpreter;
use mshell::config::Config;
use mshell::env::Environment;
use mshell::reader::{EditorReader, LineReader, StreamReader};
use mshell::table::CommandTable;
use std::io::{self, IsTerminal};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config: Config = argh::from_env();
    let env = Environment::new().with_program_timeout(config.program_timeout());
    debug!("starting in {} with {:?}", env.current_dir.display(), config);

    let mut sh =
        Interpreter::new(CommandTable::builtins(), env).with_prompt(config.prompt.as_str());

    let mut reader: Box<dyn LineReader> = if io::stdin().is_terminal() && !config.plain {
        Box::new(EditorReader::new().context("cannot set up line editor")?)
    } else {
        Box::new(StreamReader::new(io::stdin().lock(), io::stdout()))
    };

    sh.repl(reader.as_mut(), &mut io::stdout(), &mut io::stderr())
        .context("reading input failed")?;
    debug!("exiting");
    Ok(())
}
