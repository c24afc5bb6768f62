//! Option values produced by parsing.
//!
//! Checks never mutate an [`OptionMap`] directly. They return
//! [`OptionUpdate`]s, and the orchestrator folds them in with
//! [`apply_updates`] in a fixed order.

use std::collections::BTreeMap;

use codex_pool::SearchResult;
use serde::{Deserialize, Serialize};

/// Canonical option set for one command invocation.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// A typed option value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Flag or boolean option
    Bool(bool),
    /// Bounded integer
    Int(i64),
    /// Free text or an enumeration value
    Text(String),
    /// Resolved entity id
    Entity(String),
    /// Entity search still waiting for a pick
    Search(SearchResult),
    /// Attribute deltas
    Stats(StatDeltas),
    /// Ordered values
    List(Vec<OptionValue>),
    /// Nested option set (one comparison entry)
    Options(OptionMap),
}

impl OptionValue {
    /// Collapses a search into an entity id when it is unambiguous.
    #[must_use]
    pub fn from_search(search: SearchResult) -> Self {
        if search.has_results() && !search.is_multiple() {
            if let Some(id) = search.result_id() {
                return Self::Entity(id.to_string());
            }
        }
        Self::Search(search)
    }

    /// The text of a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The id of an `Entity` value.
    #[must_use]
    pub fn as_entity(&self) -> Option<&str> {
        match self {
            Self::Entity(id) => Some(id),
            _ => None,
        }
    }

    /// Returns true for an empty list, map, or stat set.
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Self::List(values) => values.is_empty(),
            Self::Options(map) => map.is_empty(),
            Self::Stats(stats) => stats.is_empty(),
            _ => false,
        }
    }
}

/// How a stat delta is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatOp {
    /// `+` or `-`: added to the base value
    Add,
    /// `=`: replaces the base value
    Equal,
}

impl StatOp {
    /// Maps an operator character to its operation and sign.
    #[must_use]
    pub fn from_char(op: char) -> Option<(Self, i64)> {
        match op {
            '+' => Some((Self::Add, 1)),
            '-' => Some((Self::Add, -1)),
            '=' => Some((Self::Equal, 1)),
            _ => None,
        }
    }
}

/// Per-attribute deltas, bucketed by operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatDeltas {
    /// Deltas from `+` and `-`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, i64>,
    /// Values from `=`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub equal: BTreeMap<String, i64>,
}

impl StatDeltas {
    /// Adds `amount` to the bucket of `op`; repeated attributes sum.
    pub fn apply(&mut self, op: StatOp, attribute: &str, amount: i64) {
        let bucket = match op {
            StatOp::Add => &mut self.add,
            StatOp::Equal => &mut self.equal,
        };
        *bucket.entry(attribute.to_string()).or_insert(0) += amount;
    }

    /// Returns true if no deltas are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.equal.is_empty()
    }
}

/// A structured (already keyed) input value.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Text
    Text(String),
    /// Sequence of values
    List(Vec<InputValue>),
    /// Search already performed by a caller
    #[serde(skip)]
    Search(SearchResult),
}

impl InputValue {
    /// The value as text, if it is scalar.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Int(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            Self::List(_) | Self::Search(_) => None,
        }
    }

    /// Converts an input left untouched by every check.
    #[must_use]
    pub fn into_option(self) -> OptionValue {
        match self {
            Self::Bool(value) => OptionValue::Bool(value),
            Self::Int(value) => OptionValue::Int(value),
            Self::Text(text) => OptionValue::Text(text),
            Self::List(values) => {
                OptionValue::List(values.into_iter().map(Self::into_option).collect())
            }
            Self::Search(search) => OptionValue::from_search(search),
        }
    }
}

impl From<&str> for InputValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One change to an option map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionUpdate {
    /// Replace the value of a key
    Set(String, OptionValue),
    /// Set a key only if it has no value yet
    SetIfAbsent(String, OptionValue),
    /// Add a stat delta under a stats key
    Stat {
        /// Option key holding the deltas
        key: String,
        /// Bucket
        op: StatOp,
        /// Attribute name
        attribute: String,
        /// Signed, clamped amount
        amount: i64,
    },
    /// Append to a list
    Push(String, OptionValue),
    /// Append to a list unless already present
    PushUnique(String, OptionValue),
    /// Drop a key
    Remove(String),
}

impl OptionUpdate {
    /// The key this update touches.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Set(key, _)
            | Self::SetIfAbsent(key, _)
            | Self::Push(key, _)
            | Self::PushUnique(key, _)
            | Self::Remove(key)
            | Self::Stat { key, .. } => key,
        }
    }
}

/// Folds `updates` into `options`, in order.
pub fn apply_updates(options: &mut OptionMap, updates: impl IntoIterator<Item = OptionUpdate>) {
    for update in updates {
        match update {
            OptionUpdate::Set(key, value) => {
                options.insert(key, value);
            }
            OptionUpdate::SetIfAbsent(key, value) => {
                options.entry(key).or_insert(value);
            }
            OptionUpdate::Stat {
                key,
                op,
                attribute,
                amount,
            } => {
                let slot = options
                    .entry(key)
                    .or_insert_with(|| OptionValue::Stats(StatDeltas::default()));
                if !matches!(slot, OptionValue::Stats(_)) {
                    *slot = OptionValue::Stats(StatDeltas::default());
                }
                if let OptionValue::Stats(stats) = slot {
                    stats.apply(op, &attribute, amount);
                }
            }
            OptionUpdate::Push(key, value) => with_list(options, key, |list| list.push(value)),
            OptionUpdate::PushUnique(key, value) => with_list(options, key, |list| {
                if !list.contains(&value) {
                    list.push(value);
                }
            }),
            OptionUpdate::Remove(key) => {
                options.remove(&key);
            }
        }
    }
}

/// Runs `edit` on the list under `key`; a non-list value is replaced.
fn with_list(options: &mut OptionMap, key: String, edit: impl FnOnce(&mut Vec<OptionValue>)) {
    let slot = options
        .entry(key)
        .or_insert_with(|| OptionValue::List(Vec::new()));
    let mut list = match std::mem::replace(slot, OptionValue::List(Vec::new())) {
        OptionValue::List(list) => list,
        _ => Vec::new(),
    };
    edit(&mut list);
    *slot = OptionValue::List(list);
}
