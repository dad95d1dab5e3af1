//! Tokenization of raw input lines into argument vectors.
//!
//! The grammar is deliberately flat: a token is a maximal run of characters that are
//! not space, tab or newline. Quotes, backslashes and `$` carry no meaning.

use log::trace;

/// Number of token slots the vector starts with, and grows by, each time it fills up.
pub const TOKEN_CHUNK: usize = 64;

const DELIMITERS: [char; 3] = [' ', '\t', '\n'];

/// Tokens of one input line, borrowed from the line itself.
///
/// Index 0 is the command name. Reading past the last token yields `None`, which
/// plays the role of the end-of-arguments sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgVector<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> ArgVector<'a> {
    /// The command name, or `None` for an empty or all-whitespace line.
    pub fn command(&self) -> Option<&'a str> {
        self.get(0)
    }

    /// Tokens following the command name.
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Token at `index`; `None` at and past the sentinel.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }

    /// Number of token slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.tokens.capacity()
    }
}

/// Split `line` on runs of space, tab and newline.
///
/// Consecutive delimiters collapse, so no empty tokens are produced. Running out of
/// memory while growing the vector terminates the process; see [`grow`].
pub fn tokenize(line: &str) -> ArgVector<'_> {
    let mut tokens = Vec::new();
    grow(&mut tokens);

    for token in line.split(DELIMITERS).filter(|t| !t.is_empty()) {
        if tokens.len() == tokens.capacity() {
            grow(&mut tokens);
            trace!("argument vector grown to {} slots", tokens.capacity());
        }
        tokens.push(token);
    }

    ArgVector { tokens }
}

/// Reserve another [`TOKEN_CHUNK`] slots.
///
/// Allocation failure is not recoverable here: the shell is a single-user
/// interactive tool, so it prints a diagnostic and exits rather than threading an
/// out-of-memory error through the loop.
fn grow(tokens: &mut Vec<&str>) {
    if let Err(e) = tokens.try_reserve_exact(TOKEN_CHUNK) {
        eprintln!("mshell: allocation error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_spaces_tabs_and_newlines() {
        let argv = tokenize("mmkdir  a\tb \t\nc\n");
        assert_eq!(argv.iter().collect::<Vec<_>>(), vec!["mmkdir", "a", "b", "c"]);
        assert_eq!(argv.command(), Some("mmkdir"));
        assert_eq!(argv.args(), &["a", "b", "c"]);
    }

    #[test]
    fn test_sentinel_follows_last_token() {
        let argv = tokenize("mrename old new");
        assert_eq!(argv.len(), 3);
        assert_eq!(argv.get(2), Some("new"));
        assert_eq!(argv.get(3), None);
        assert_eq!(argv.get(100), None);
    }

    #[test]
    fn test_empty_and_blank_lines_have_no_command() {
        for line in ["", " ", "\t\t", "  \n", " \t \n \t"] {
            let argv = tokenize(line);
            assert!(argv.is_empty(), "line {line:?}");
            assert_eq!(argv.command(), None);
            assert!(argv.args().is_empty());
        }
    }

    #[test]
    fn test_tokens_are_kept_verbatim() {
        let argv = tokenize(r#"mecho "quoted words" $HOME it\'s *.rs"#);
        assert_eq!(
            argv.args(),
            &["\"quoted", "words\"", "$HOME", "it\\'s", "*.rs"]
        );
    }

    #[test]
    fn test_tokens_borrow_from_the_line() {
        let line = String::from("mtouch file");
        let argv = tokenize(&line);
        let name = argv.get(1).unwrap();
        let offset = name.as_ptr() as usize - line.as_ptr() as usize;
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_starts_with_one_chunk() {
        let argv = tokenize("mpwd");
        assert!(argv.capacity() >= TOKEN_CHUNK);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let words: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
        let line = words.join(" \t");
        let argv = tokenize(&line);

        assert_eq!(argv.len(), 200);
        assert!(argv.capacity() >= 200);
        assert_eq!(argv.get(199), Some("w199"));
        assert_eq!(argv.get(200), None);
        assert!(argv.iter().eq(words.iter().map(String::as_str)));
    }

    #[test]
    fn test_carriage_return_is_not_a_delimiter() {
        let argv = tokenize("mecho a\r");
        assert_eq!(argv.args(), &["a\r"]);
    }
}
