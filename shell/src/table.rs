use crate::command::CommandFactory;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::OnceLock;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, i.e. types implementing the
/// crate-private `BuiltinCommand` trait.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

/// Read-only mapping from command name to the factory that builds it.
///
/// Lookup is an exact, case-sensitive match on the registered name; there is no
/// prefix matching and no aliasing.
pub struct CommandTable {
    commands: HashMap<&'static str, Box<dyn CommandFactory>>,
}

impl CommandTable {
    /// Build a table from a set of factories.
    ///
    /// A later factory replaces an earlier one registered under the same name.
    pub fn new(factories: Vec<Box<dyn CommandFactory>>) -> Self {
        let commands = factories
            .into_iter()
            .map(|factory| (factory.name(), factory))
            .collect();
        Self { commands }
    }

    /// The process-wide table of built-in commands, built on first use.
    pub fn builtins() -> &'static CommandTable {
        static TABLE: OnceLock<CommandTable> = OnceLock::new();
        TABLE.get_or_init(|| CommandTable::new(builtin_factories()))
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.commands.get(name).map(|factory| factory.as_ref())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn builtin_factories() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    vec![
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Ls>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Uname>::default()),
        Box::new(Factory::<Mkdir>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<Rmdir>::default()),
        Box::new(Factory::<Rm>::default()),
        Box::new(Factory::<Touch>::default()),
        Box::new(Factory::<Locate>::default()),
        Box::new(Factory::<FileKind>::default()),
        Box::new(Factory::<Df>::default()),
        Box::new(Factory::<Ps>::default()),
        Box::new(Factory::<Hostname>::default()),
        Box::new(Factory::<Time>::default()),
        Box::new(Factory::<Date>::default()),
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Kill>::default()),
        Box::new(Factory::<Netstat>::default()),
        Box::new(Factory::<Ping>::default()),
        Box::new(Factory::<DateTime>::default()),
        Box::new(Factory::<Jobs>::default()),
        Box::new(Factory::<Top>::default()),
        Box::new(Factory::<Ifconfig>::default()),
        Box::new(Factory::<Who>::default()),
        Box::new(Factory::<Cal>::default()),
        Box::new(Factory::<Rename>::default()),
        Box::new(Factory::<Edit>::default()),
        Box::new(Factory::<Shutdown>::default()),
        Box::new(Factory::<Restart>::default()),
    ]
}
