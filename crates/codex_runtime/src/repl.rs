//! Interactive loop over a [`Session`], with numbered pick prompts.

use std::time::{Duration, Instant};

use codex_foundation::{Error, Result};
use codex_parser::{Disambiguator, PickRequest, PickResponse};
use tracing::debug;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::{Outcome, Session};

/// Prompt loop feeding lines to a session.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,

    session: Session,
    show_banner: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Opens a terminal-backed loop for `session`.
    ///
    /// # Errors
    ///
    /// Fails when the terminal editor cannot start.
    pub fn new(session: Session) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Loop reading from `editor`. Completion starts with the session's command names.
    pub fn with_editor(mut editor: E, session: Session) -> Self {
        editor.set_keywords(session.keywords());
        Self {
            editor,
            session,
            show_banner: true,
            prompt: "codex> ".to_string(),
        }
    }

    /// Skips the version and module line printed on start.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Replaces the `codex> ` prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The session being driven.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access, for settings changed outside a line.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Reads and evaluates lines until `:quit` or end of input.
    ///
    /// Errors from single lines are printed and the loop goes on.
    ///
    /// # Errors
    ///
    /// Currently always `Ok`.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.step() {
                Ok(false) => break,
                Ok(true) => {}
                Err(e) => print_error(&e),
            }
        }

        println!("\nbye");
        Ok(())
    }

    /// One prompt. `false` ends the loop.
    fn step(&mut self) -> Result<bool> {
        let input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Outcome::Quit) => return Ok(false),
            Ok(outcome) => print_outcome(&outcome)?,
            Err(e) => print_error(&e),
        }

        // `:module` may have changed the command names.
        self.editor.set_keywords(self.session.keywords());
        Ok(true)
    }

    /// Evaluates one line, prompting for picks through the editor.
    ///
    /// # Errors
    ///
    /// Returns the session's error for the line.
    pub fn eval(&mut self, input: &str) -> Result<Outcome> {
        let timeout = self.session.config().pick_timeout;
        let mut picker = PromptPicker::new(&mut self.editor, timeout);
        self.session.eval(input, &mut picker)
    }

    /// Evaluates lines without prompting, stopping at `:quit`.
    ///
    /// # Errors
    ///
    /// Returns the first error.
    pub fn eval_batch<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for line in lines {
            let outcome = self.eval(line)?;
            if outcome == Outcome::Quit {
                break;
            }
            print_outcome(&outcome)?;
        }
        Ok(())
    }

    fn print_banner(&self) {
        let module = self.session.module();
        println!("\x1b[1;36mCodex\x1b[0m {}", env!("CARGO_PKG_VERSION"));
        println!(
            "Module \x1b[1m{}\x1b[0m with {} commands. Type :help for help, :quit or Ctrl+D to exit.\n",
            module.name(),
            module.commands().count()
        );
    }
}

fn print_outcome(outcome: &Outcome) -> Result<()> {
    if *outcome == Outcome::Abandoned {
        println!("\x1b[2m(no selection, request dropped)\x1b[0m");
        return Ok(());
    }
    if let Some(text) = outcome.render()? {
        println!("{text}");
    }
    Ok(())
}

fn print_error(error: &Error) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
    if let Some(context) = &error.context {
        eprintln!("\x1b[2m{context}\x1b[0m");
    }
}

/// Asks for picks on the REPL's own editor.
///
/// An answer arriving after `timeout`, an empty answer, or a number outside
/// the list abandons the request.
pub struct PromptPicker<'e, E: LineEditor> {
    editor: &'e mut E,
    timeout: Duration,
}

impl<'e, E: LineEditor> PromptPicker<'e, E> {
    /// Creates a picker reading from `editor`.
    pub fn new(editor: &'e mut E, timeout: Duration) -> Self {
        Self { editor, timeout }
    }
}

impl<E: LineEditor> Disambiguator for PromptPicker<'_, E> {
    fn pick(&mut self, request: &PickRequest) -> PickResponse {
        println!("Several matches for '{}' ({}):", request.text, request.key);
        for (index, entity) in request.candidates.iter().enumerate() {
            println!("  {:>2}. {} \x1b[2m[{}]\x1b[0m", index + 1, entity.display, entity.section);
        }
        if request.overflow > 0 {
            println!("  ... and {} more. Refine the query to see them.", request.overflow);
        }

        let asked = Instant::now();
        let answer = match self.editor.read_line("pick #> ") {
            Ok(ReadResult::Line(line)) => line,
            Ok(ReadResult::Interrupted | ReadResult::Eof) => return PickResponse::Cancelled,
            Err(e) => {
                debug!(error = %e, "pick prompt failed");
                return PickResponse::Cancelled;
            }
        };
        if asked.elapsed() >= self.timeout {
            return PickResponse::Timeout;
        }

        answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| request.candidates.get(index))
            .map_or(PickResponse::Cancelled, |entity| PickResponse::Chosen(entity.id.clone()))
    }
}
