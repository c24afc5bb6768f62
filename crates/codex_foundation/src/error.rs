//! One error type for every Codex layer, carrying an optional request context.
//!
//! Only [`ErrorKind::Configuration`] is meant to halt a process. Everything
//! else is a per-request outcome that callers render and move past.

use std::fmt;

use thiserror::Error;

/// Result alias used across every Codex crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed lookup, parse or load, with the request it belongs to.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// Category, for matching.
    pub kind: ErrorKind,
    /// Request details, attached once the command is known.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Error without context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches the request details.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a configuration error (detected at registration time).
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates a malformed parameter error for the given option key.
    #[must_use]
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedParameter {
            key: key.into(),
            reason: reason.into(),
        })
    }

    /// Creates an entity-not-found error for the given option key.
    #[must_use]
    pub fn not_found(key: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound {
            key: key.into(),
            query: query.into(),
        })
    }

    /// Creates an abandoned-request error.
    #[must_use]
    pub fn abandoned() -> Self {
        Self::new(ErrorKind::Abandoned)
    }

    /// Creates a catalog loading error.
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Catalog(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error must abort startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }
}

/// What went wrong.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A command or module definition is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A structured value could not be coerced to its check's type.
    #[error("malformed parameter `{key}`: {reason}")]
    MalformedParameter {
        /// The option key that failed.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// No entity matched a reference.
    #[error("no entries with \"{query}\" found for `{key}`")]
    NotFound {
        /// The option key being resolved.
        key: String,
        /// The raw text that was searched.
        query: String,
    },

    /// Disambiguation timed out or was cancelled.
    #[error("request abandoned during disambiguation")]
    Abandoned,

    /// Catalog data could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Alias list is full.
    #[error("alias limit reached ({limit})")]
    AliasLimit {
        /// Aliases allowed per scope.
        limit: usize,
    },

    /// Alias text is outside the allowed length.
    #[error("alias must be between {min} and {max} characters")]
    InvalidAlias {
        /// Minimum normalized length.
        min: usize,
        /// Maximum normalized length.
        max: usize,
    },

    /// An index did not refer to an existing record.
    #[error("invalid index: {0}")]
    InvalidIndex(usize),

    /// I/O failure.
    #[error("io error: {0}")]
    Io(String),

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A bug or an I/O failure outside the request.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The request an error was raised for.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Command being parsed.
    pub command: Option<String>,
    /// Catalog scope (module) of the command.
    pub scope: Option<String>,
    /// Option keys and values collected before the failure.
    pub options: Vec<(String, String)>,
}

impl ErrorContext {
    /// Context with nothing recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command name.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Sets the scope name.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Records an option collected so far.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.scope, &self.command) {
            (Some(scope), Some(command)) => write!(f, "in {scope} {command}")?,
            (None, Some(command)) => write!(f, "in {command}")?,
            (Some(scope), None) => write!(f, "in {scope}")?,
            (None, None) => {}
        }
        for (key, value) in &self.options {
            write!(f, "\n  {key}: {value}")?;
        }
        Ok(())
    }
}
