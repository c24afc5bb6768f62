//! Typed parameter checks.
//!
//! A [`Check`] binds one option key to one [`CheckKind`]. Every variant
//! answers the same questions:
//!
//! - does this free-text or structured key belong to me?
//! - what updates does this token (or typed value) produce?
//! - how do I declare myself, and what does a usage example look like?
//!
//! Checks are pure. They return [`OptionUpdate`]s and never touch the
//! option map themselves.

pub mod choice;
pub mod entry;
pub mod int;
pub mod level;
pub mod list;
pub mod stats;

use std::sync::Arc;

use codex_foundation::{Error, Result};
use codex_pool::{Pool, SearchContext};
use rand::Rng;

pub use choice::ChoiceCheck;
pub use entry::EntryCheck;
pub use int::IntCheck;
pub use level::LevelCheck;
pub use list::ListCheck;
pub use stats::{StatToken, StatsCheck};

use crate::help::{ChoiceDescriptor, OptionDescriptor, OptionKind};
use crate::params::ParameterValue;
use crate::value::{InputValue, OptionMap, OptionUpdate, OptionValue};

/// Default start marker shown in examples.
pub const DEFAULT_PREFIX: &str = "-";

/// The closed set of check variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckKind {
    /// Numeric-delta set
    Stats(StatsCheck),
    /// Enumeration
    Choice(ChoiceCheck),
    /// Multi-value list
    List(ListCheck),
    /// Bounded integer
    Int(IntCheck),
    /// Nested entity reference
    Entry(EntryCheck),
    /// Boolean flag
    Flag,
    /// Ordered numeric sequence
    Level(LevelCheck),
}

impl CheckKind {
    /// Short name of the variant, as used in command definitions.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Stats(_) => "stats",
            Self::Choice(_) => "choice",
            Self::List(_) => "list",
            Self::Int(_) => "int",
            Self::Entry(_) => "entry",
            Self::Flag => "bool",
            Self::Level(_) => "level",
        }
    }
}

/// A typed recognizer and extractor for one option key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    key: String,
    prefix: Option<String>,
    kind: CheckKind,
}

impl Check {
    /// Creates a check for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            key: key.into().to_lowercase(),
            prefix: None,
            kind,
        }
    }

    /// Stat deltas over `attributes`.
    #[must_use]
    pub fn stats(key: impl Into<String>, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(key, CheckKind::Stats(StatsCheck::new(attributes)))
    }

    /// Enumeration over `(label, value)` pairs.
    #[must_use]
    pub fn choice(
        key: impl Into<String>,
        table: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self::new(key, CheckKind::Choice(ChoiceCheck::new(table)))
    }

    /// List over `allowed` values.
    #[must_use]
    pub fn list(key: impl Into<String>, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(key, CheckKind::List(ListCheck::new(allowed)))
    }

    /// Integer clamped into `[min, max]`.
    #[must_use]
    pub fn int(key: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(key, CheckKind::Int(IntCheck::new(min, max)))
    }

    /// Entity reference into `pool`.
    #[must_use]
    pub fn entry(key: impl Into<String>, pool: Arc<Pool>) -> Self {
        Self::new(key, CheckKind::Entry(EntryCheck::new(pool)))
    }

    /// Boolean flag.
    #[must_use]
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, CheckKind::Flag)
    }

    /// Level sequence with one maximum per position.
    #[must_use]
    pub fn level(key: impl Into<String>, maxima: Vec<i64>) -> Self {
        Self::new(key, CheckKind::Level(LevelCheck::new(maxima)))
    }

    /// Requires tokens for this check to start with `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The option key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The variant.
    #[must_use]
    pub fn kind(&self) -> &CheckKind {
        &self.kind
    }

    /// The configured prefix override, if any.
    #[must_use]
    pub fn prefix_override(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Marker used in examples.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// The secondary pool of an entry check.
    #[must_use]
    pub fn pool(&self) -> Option<&Arc<Pool>> {
        match &self.kind {
            CheckKind::Entry(entry) => Some(entry.pool()),
            _ => None,
        }
    }

    /// Whether a free-text key for this check is followed by a value.
    #[must_use]
    pub fn declares_value(&self) -> bool {
        !matches!(self.kind, CheckKind::Flag)
    }

    /// Whether `candidate` names this check, given what is parsed so far.
    #[must_use]
    pub fn matches_key(&self, candidate: &str, options: &OptionMap) -> bool {
        if let CheckKind::Choice(choice) = &self.kind {
            return !options.contains_key(&self.key)
                && (candidate == self.key || choice.lookup(candidate).is_some());
        }
        if candidate == self.key {
            return true;
        }
        match &self.kind {
            CheckKind::Stats(stats) => stats.is_stat(candidate),
            CheckKind::List(list) => list.allows(candidate),
            CheckKind::Int(int) => int.parse(candidate).is_some(),
            _ => false,
        }
    }

    /// Like [`Check::matches_key`], but the token's marker counts too.
    ///
    /// A check with a prefix override only accepts tokens introduced by that
    /// prefix which do not spell the key itself.
    #[must_use]
    pub fn matches_parameter(&self, parameter: &ParameterValue, options: &OptionMap) -> bool {
        if let Some(prefix) = &self.prefix {
            if parameter.start != *prefix || parameter.key == self.key {
                return false;
            }
        }
        if let CheckKind::Stats(stats) = &self.kind {
            if stats.parse(&parameter.key, parameter.start_char()).is_some() {
                return true;
            }
        }
        self.matches_key(&parameter.key, options)
    }

    /// Updates produced by one free-text parameter.
    ///
    /// Entity references are searched here; the raw search is stored so the
    /// orchestrator can decide whether a pick is needed.
    #[must_use]
    pub fn extract_from_tokens(&self, parameter: &ParameterValue, ctx: &SearchContext) -> Vec<OptionUpdate> {
        let key = self.key.clone();
        match &self.kind {
            CheckKind::Stats(stats) => {
                let tokens = if parameter.key == self.key {
                    stats.parse_list(&parameter.value)
                } else {
                    stats
                        .parse(&parameter.key, parameter.start_char())
                        .into_iter()
                        .collect()
                };
                tokens.iter().flat_map(|t| stats.updates(&key, t)).collect()
            }
            CheckKind::Choice(choice) => choice
                .lookup(&parameter.key)
                .or_else(|| choice.lookup(&parameter.value))
                .map(|value| OptionUpdate::SetIfAbsent(key, OptionValue::Text(value.to_string())))
                .into_iter()
                .collect(),
            CheckKind::List(list) => {
                let values = if list.allows(&parameter.key) {
                    vec![parameter.key.clone()]
                } else {
                    list.parse(&parameter.value)
                };
                values
                    .into_iter()
                    .map(|value| OptionUpdate::PushUnique(key.clone(), OptionValue::Text(value)))
                    .collect()
            }
            CheckKind::Int(int) => int
                .parse(&parameter.key)
                .or_else(|| int.parse(&parameter.value))
                .map(|value| OptionUpdate::Set(key, OptionValue::Int(value)))
                .into_iter()
                .collect(),
            CheckKind::Entry(entry) => {
                if parameter.value.is_empty() {
                    return Vec::new();
                }
                let search = entry.search(&parameter.value, ctx);
                vec![OptionUpdate::Set(key, OptionValue::Search(search))]
            }
            CheckKind::Flag => vec![OptionUpdate::Set(key, OptionValue::Bool(true))],
            CheckKind::Level(level) => level_update(key, level.parse(&parameter.value))
                .into_iter()
                .collect(),
        }
    }

    /// Updates produced by one structured value.
    ///
    /// # Errors
    ///
    /// Returns a malformed-parameter error when `value` cannot be coerced to
    /// this check's type.
    pub fn extract_from_structured(&self, value: InputValue, ctx: &SearchContext) -> Result<Vec<OptionUpdate>> {
        let key = self.key.clone();
        let malformed = |reason: &str| Error::malformed(self.key.clone(), reason);

        match &self.kind {
            CheckKind::Stats(stats) => {
                let text = joined_text(&value).ok_or_else(|| malformed("expected stat deltas"))?;
                let tokens = stats.parse_list(&text);
                if tokens.is_empty() {
                    return Err(malformed("no valid stat deltas"));
                }
                Ok(tokens.iter().flat_map(|t| stats.updates(&key, t)).collect())
            }
            CheckKind::Choice(choice) => {
                let text = value.to_text().ok_or_else(|| malformed("expected a single value"))?;
                let found = choice
                    .lookup(&text)
                    .ok_or_else(|| malformed("not an allowed value"))?;
                Ok(vec![OptionUpdate::Set(key, OptionValue::Text(found.to_string()))])
            }
            CheckKind::List(list) => {
                let text = joined_text(&value).ok_or_else(|| malformed("expected a list of values"))?;
                let values = list.parse(&text);
                if values.is_empty() {
                    return Err(malformed("no allowed values"));
                }
                let values = values.into_iter().map(OptionValue::Text).collect();
                Ok(vec![OptionUpdate::Set(key, OptionValue::List(values))])
            }
            CheckKind::Int(int) => {
                let parsed = match &value {
                    InputValue::Int(number) => Some(int.clamp(*number)),
                    InputValue::Text(text) => int.parse(text),
                    _ => None,
                };
                let number = parsed.ok_or_else(|| malformed("expected an integer"))?;
                Ok(vec![OptionUpdate::Set(key, OptionValue::Int(number))])
            }
            CheckKind::Entry(entry) => {
                let resolved = entry_value(entry, value, ctx).ok_or_else(|| malformed("expected entity names"))?;
                Ok(vec![OptionUpdate::Set(key, resolved)])
            }
            CheckKind::Flag => {
                let flag = match &value {
                    InputValue::Bool(flag) => Some(*flag),
                    InputValue::Text(text) => text.trim().to_lowercase().parse::<bool>().ok(),
                    _ => None,
                };
                let flag = flag.ok_or_else(|| malformed("expected true or false"))?;
                Ok(vec![OptionUpdate::Set(key, OptionValue::Bool(flag))])
            }
            CheckKind::Level(level) => match value {
                InputValue::Text(text) => Ok(vec![
                    level_update(key.clone(), level.parse(&text)).unwrap_or(OptionUpdate::Remove(key)),
                ]),
                InputValue::Int(number) => Ok(level_update(key, level.fit(&[number])).into_iter().collect()),
                InputValue::List(values) => {
                    let numbers = values
                        .iter()
                        .map(|v| match v {
                            InputValue::Int(number) => Some(*number),
                            InputValue::Text(text) => text.trim().parse().ok(),
                            _ => None,
                        })
                        .collect::<Option<Vec<i64>>>()
                        .ok_or_else(|| malformed("expected a list of levels"))?;
                    Ok(vec![
                        level_update(key.clone(), level.fit(&numbers)).unwrap_or(OptionUpdate::Remove(key)),
                    ])
                }
                InputValue::Bool(_) | InputValue::Search(_) => Err(malformed("expected levels")),
            },
        }
    }

    /// Declaration of this check for structured input surfaces.
    #[must_use]
    pub fn describe_option(&self) -> OptionDescriptor {
        let kind = match self.kind {
            CheckKind::Int(_) => OptionKind::Integer,
            CheckKind::Flag => OptionKind::Boolean,
            _ => OptionKind::Text,
        };
        let descriptor = OptionDescriptor::new(self.key.clone(), kind);
        match &self.kind {
            CheckKind::Choice(choice) => descriptor.with_choices(
                choice
                    .table()
                    .iter()
                    .map(|(name, value)| ChoiceDescriptor {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            ),
            _ => descriptor,
        }
    }

    /// A human-readable usage example, if this check has one.
    pub fn example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let prefix = self.prefix();
        match &self.kind {
            CheckKind::Stats(stats) => stats.example(prefix, rng),
            CheckKind::Choice(choice) => choice.example(prefix, rng),
            CheckKind::List(list) => list.example(prefix, rng),
            CheckKind::Int(int) => Some(int.example(prefix, rng)),
            CheckKind::Entry(entry) => entry
                .example(rng)
                .map(|display| format!("{prefix}{} {display}", self.key)),
            CheckKind::Flag => Some(format!("{prefix}{}", self.key)),
            CheckKind::Level(level) => level.example(rng),
        }
    }
}

fn level_update(key: String, levels: Vec<i64>) -> Option<OptionUpdate> {
    if levels.is_empty() {
        return None;
    }
    let levels = levels.into_iter().map(OptionValue::Int).collect();
    Some(OptionUpdate::Set(key, OptionValue::List(levels)))
}

/// Scalar text, or list items joined with commas.
fn joined_text(value: &InputValue) -> Option<String> {
    match value {
        InputValue::List(values) => values
            .iter()
            .map(InputValue::to_text)
            .collect::<Option<Vec<_>>>()
            .map(|texts| texts.join(",")),
        other => other.to_text(),
    }
}

fn entry_value(entry: &EntryCheck, value: InputValue, ctx: &SearchContext) -> Option<OptionValue> {
    match value {
        InputValue::Search(search) => Some(OptionValue::Search(search)),
        InputValue::Text(text) => Some(OptionValue::Search(entry.search(&text, ctx))),
        InputValue::Int(number) => Some(OptionValue::Search(entry.search(&number.to_string(), ctx))),
        InputValue::List(values) => values
            .into_iter()
            .map(|v| match v {
                InputValue::List(_) | InputValue::Bool(_) => None,
                scalar => entry_value(entry, scalar, ctx),
            })
            .collect::<Option<Vec<_>>>()
            .map(OptionValue::List),
        InputValue::Bool(_) => None,
    }
}
