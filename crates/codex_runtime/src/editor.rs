//! Line input for the REPL and the pick prompt.
//!
//! Both read through [`LineEditor`], so tests script their input while the
//! binary talks to a terminal through rustyline.

use std::borrow::Cow;

use codex_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator};

/// Lines kept in the in-memory history.
const HISTORY_SIZE: usize = 1000;

/// Second words offered after a meta command.
const META_ARGUMENTS: &[(&str, &[&str])] = &[
    (":alias", &["user", "scope"]),
    (":random", &["on", "off"]),
];

/// What one read produced.
#[derive(Debug)]
pub enum ReadResult {
    /// A full line
    Line(String),
    /// Ctrl+C
    Interrupted,
    /// Ctrl+D or closed input
    Eof,
}

/// Source of input lines.
pub trait LineEditor {
    /// Shows `prompt` and reads one line.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Remembers `line` for history navigation.
    fn add_history(&mut self, line: &str);

    /// Replaces the words offered when completing the first word.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

#[derive(Helper, Completer, Hinter, Validator)]
struct CodexHelper {
    #[rustyline(Completer)]
    completer: KeywordCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for CodexHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes command names and meta commands, plus the scope or switch
/// that follows `:alias` and `:random`.
#[derive(Default)]
struct KeywordCompleter {
    keywords: Vec<String>,
}

impl KeywordCompleter {
    fn candidates(&self, head: &str) -> (usize, Vec<String>) {
        match head.split_once(char::is_whitespace) {
            None => (
                0,
                self.keywords
                    .iter()
                    .filter(|keyword| keyword.starts_with(head))
                    .cloned()
                    .collect(),
            ),
            Some((meta, partial)) if !partial.contains(char::is_whitespace) => {
                let words = META_ARGUMENTS
                    .iter()
                    .find(|(name, _)| *name == meta)
                    .map_or(&[][..], |(_, words)| *words);
                (
                    meta.len() + 1,
                    words
                        .iter()
                        .filter(|word| word.starts_with(partial))
                        .map(|word| (*word).to_string())
                        .collect(),
                )
            }
            Some(_) => (head.len(), Vec::new()),
        }
    }
}

impl Completer for KeywordCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

/// [`LineEditor`] on a terminal.
pub struct RustylineEditor {
    editor: Editor<CodexHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Opens the terminal editor with completion and history hints.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the terminal cannot be set up.
    pub fn new() -> Result<Self> {
        let internal = |e: ReadlineError| Error::new(ErrorKind::Internal(e.to_string()));
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(HISTORY_SIZE)
            .map_err(internal)?
            .build();

        let mut editor = Editor::with_config(config).map_err(internal)?;
        editor.set_helper(Some(CodexHelper {
            completer: KeywordCompleter::default(),
            hinter: HistoryHinter::new(),
        }));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Internal(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::debug!(error = %e, "history entry dropped");
        }
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
