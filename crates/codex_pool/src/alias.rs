//! Custom alias substitution.
//!
//! Users and groups can map a nickname onto a catalog's canonical name.
//! [`AliasResolver`] applies those mappings to raw query text before pool
//! search, and [`AliasBook`] edits one scope's alias list with the limits
//! that keep those lists small.

use codex_foundation::{Error, ErrorKind, Normalize, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Characters never stored in an alias.
const BANNED: &[char] = &['"', '\'', '\\', '\n'];

/// Shortest allowed normalized alias text.
pub const MIN_ALIAS_LEN: usize = 3;
/// Longest allowed normalized alias text.
pub const MAX_ALIAS_LEN: usize = 30;
/// Most aliases one scope may hold.
pub const ALIAS_LIMIT: usize = 30;

/// Alias text in normalized and display form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasText {
    /// Normalized with spaces kept
    pub clean: String,
    /// As the user typed it
    pub display: String,
}

impl AliasText {
    /// Creates alias text, deriving the clean form.
    #[must_use]
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        Self {
            clean: Normalize::new().keep_space().apply(&display),
            display,
        }
    }
}

/// One `alias -> original` mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Canonical text substituted in
    pub original: AliasText,
    /// Nickname looked for
    pub alias: AliasText,
}

impl AliasRecord {
    /// Creates a record from display strings.
    #[must_use]
    pub fn new(original: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            original: AliasText::new(original),
            alias: AliasText::new(alias),
        }
    }
}

/// Whose aliases a list belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AliasScope {
    /// A single user
    User(String),
    /// A group of users (server, channel, team)
    Group(String),
}

/// Read-only access to persisted alias lists.
///
/// Implementations that also write must serialize writers per scope.
pub trait AliasSource {
    /// Returns the ordered alias list for `scope` (empty if none).
    fn aliases(&self, scope: &AliasScope) -> Vec<AliasRecord>;
}

/// Compiled alias substitutions for one request.
#[derive(Clone, Debug, Default)]
pub struct AliasResolver {
    rules: Vec<(Regex, String, String)>,
}

impl AliasResolver {
    /// Compiles user aliases followed by broader-scope aliases.
    ///
    /// # Errors
    ///
    /// Returns an error if an alias pattern cannot be compiled.
    pub fn new(user: &[AliasRecord], scope: &[AliasRecord]) -> Result<Self> {
        let mut rules = Vec::with_capacity(user.len() + scope.len());

        for record in user.iter().chain(scope) {
            let alias = record.alias.clean.as_str();
            if alias.is_empty() {
                warn!(original = %record.original.display, "skipping empty alias");
                continue;
            }
            let pattern = format!(r"\b{}\d{{0,2}}\b", regex::escape(alias));
            let regex = Regex::new(&pattern)
                .map_err(|e| Error::internal(format!("alias pattern `{alias}`: {e}")))?;
            rules.push((regex, alias.to_string(), record.original.clean.clone()));
        }

        Ok(Self { rules })
    }

    /// Returns true if no aliases are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every alias once, in order, and returns normalized text.
    ///
    /// Each alias replaces only its first whole-word occurrence, optionally
    /// followed by up to two digits (`lucy2` becomes `lucina2`).
    #[must_use]
    pub fn resolve(&self, text: &str) -> String {
        let mut text = Normalize::new().keep_space().apply(text);

        for (regex, alias, original) in &self.rules {
            let Some(found) = regex.find(&text) else {
                continue;
            };
            let replaced = found.as_str().replacen(alias.as_str(), original, 1);
            trace!(alias = %alias, original = %original, "alias substituted");
            text = format!("{}{}{}", &text[..found.start()], replaced, &text[found.end()..]);
        }

        Normalize::new().apply(&text)
    }
}

/// Editable alias list for one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasBook {
    records: Vec<AliasRecord>,
}

impl AliasBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing list.
    #[must_use]
    pub fn from_records(records: Vec<AliasRecord>) -> Self {
        Self { records }
    }

    /// The records in substitution order.
    #[must_use]
    pub fn records(&self) -> &[AliasRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the book holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds `alias -> original`.
    ///
    /// # Errors
    ///
    /// Fails when the book is full or either side is too short or too long
    /// once normalized.
    pub fn add(&mut self, original: &str, alias: &str) -> Result<&AliasRecord> {
        if self.records.len() >= ALIAS_LIMIT {
            return Err(Error::new(ErrorKind::AliasLimit { limit: ALIAS_LIMIT }));
        }

        let record = AliasRecord::new(strip_banned(original), strip_banned(alias));
        let fits = |text: &AliasText| {
            let len = text.clean.chars().count();
            (MIN_ALIAS_LEN..=MAX_ALIAS_LEN).contains(&len)
        };
        if !fits(&record.original) || !fits(&record.alias) {
            return Err(Error::new(ErrorKind::InvalidAlias {
                min: MIN_ALIAS_LEN,
                max: MAX_ALIAS_LEN,
            }));
        }

        self.records.push(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Removes the record at 1-based `index` (0 is read as 1).
    ///
    /// # Errors
    ///
    /// Fails when no record exists at that position.
    pub fn remove(&mut self, index: usize) -> Result<AliasRecord> {
        let position = index.saturating_sub(1);
        if position >= self.records.len() {
            return Err(Error::new(ErrorKind::InvalidIndex(index)));
        }
        Ok(self.records.remove(position))
    }
}

fn strip_banned(text: &str) -> String {
    text.chars().filter(|ch| !BANNED.contains(ch)).collect()
}
