//! Free-text parameter tokenizer.
//!
//! Words left over after the entity phrase are grouped into
//! [`ParameterValue`]s. A word starting with a start marker opens a
//! parameter:
//!
//! ```text
//! -weapon killing edge -personal 10
//! ^^^^^^^ ^^^^^^^^^^^^ ^^^^^^^^^ ^^
//! key     value run    flag      unmatched
//! ```
//!
//! Only keys that declare a value open a value run; every other marked word
//! becomes a value-less parameter. Unmarked words outside a run are returned
//! as unmatched.

use std::collections::HashSet;

/// Start markers recognised by every command, longest first.
pub const DEFAULT_MARKERS: &[&str] = &["--", "-", "~~", "~", "+"];

/// One marked token group from free text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterValue {
    /// Lowercased key after the marker
    pub key: String,
    /// Marker that introduced the key
    pub start: String,
    /// Space-joined, lowercased value run (may be empty)
    pub value: String,
}

impl ParameterValue {
    /// Creates a parameter value, lowercasing every part.
    #[must_use]
    pub fn new(key: &str, start: &str, value: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            start: start.to_lowercase(),
            value: value.trim().to_lowercase(),
        }
    }

    /// The marker as a single character, if it is one.
    #[must_use]
    pub fn start_char(&self) -> Option<char> {
        let mut chars = self.start.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

/// Output of [`ParameterTokenizer::tokenize`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// Parameters in input order
    pub values: Vec<ParameterValue>,
    /// Words outside any parameter
    pub unmatched: Vec<String>,
}

/// Splits words into parameters for one command.
#[derive(Clone, Debug)]
pub struct ParameterTokenizer {
    markers: Vec<String>,
    value_keys: HashSet<String>,
}

impl ParameterTokenizer {
    /// Creates a tokenizer with the default markers plus `extra` ones.
    ///
    /// `value_keys` lists every key (aliases included) that takes a value.
    #[must_use]
    pub fn new<'a>(
        extra: impl IntoIterator<Item = &'a str>,
        value_keys: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut markers: Vec<String> = DEFAULT_MARKERS.iter().map(|m| (*m).to_string()).collect();
        for marker in extra {
            if !marker.is_empty() && !markers.iter().any(|m| m == marker) {
                markers.push(marker.to_string());
            }
        }
        // Stable sort keeps declaration order among equal lengths.
        markers.sort_by_key(|marker| std::cmp::Reverse(marker.chars().count()));

        Self {
            markers,
            value_keys: value_keys.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Recognised markers, longest first.
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Returns true if `key` opens a value run.
    #[must_use]
    pub fn takes_value(&self, key: &str) -> bool {
        self.value_keys.contains(key)
    }

    fn split_marker<'w>(&self, word: &'w str) -> Option<(&str, &'w str)> {
        self.markers.iter().find_map(|marker| {
            word.strip_prefix(marker.as_str())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (marker.as_str(), rest))
        })
    }

    /// Groups `words` into parameters.
    #[must_use]
    pub fn tokenize(&self, words: &[String]) -> Tokenized {
        let mut out = Tokenized::default();
        let mut open: Option<(String, String)> = None;
        let mut run: Vec<&str> = Vec::new();

        for word in words {
            let Some((start, rest)) = self.split_marker(word) else {
                if open.is_some() {
                    run.push(word);
                } else {
                    out.unmatched.push(word.clone());
                }
                continue;
            };

            flush(&mut open, &mut run, &mut out);
            let key = rest.to_lowercase();
            if self.takes_value(&key) {
                open = Some((key, start.to_string()));
            } else {
                out.values.push(ParameterValue::new(&key, start, ""));
            }
        }
        flush(&mut open, &mut run, &mut out);

        out
    }
}

/// Emits the open parameter if its value run is non-empty.
fn flush(open: &mut Option<(String, String)>, run: &mut Vec<&str>, out: &mut Tokenized) {
    if let Some((key, start)) = open.take() {
        if !run.is_empty() {
            out.values.push(ParameterValue::new(&key, &start, &run.join(" ")));
        }
    }
    run.clear();
}
