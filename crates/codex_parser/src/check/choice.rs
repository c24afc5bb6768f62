//! Enumerations.

use codex_foundation::normalize;
use rand::Rng;
use rand::seq::SliceRandom;

/// A fixed mapping of human labels to canonical values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceCheck {
    table: Vec<(String, String)>,
}

impl ChoiceCheck {
    /// Creates a check from `(label, value)` pairs.
    #[must_use]
    pub fn new(table: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            table: table
                .into_iter()
                .map(|(label, value)| (label.into(), value.into().to_lowercase()))
                .collect(),
        }
    }

    /// The `(label, value)` pairs in declaration order.
    #[must_use]
    pub fn table(&self) -> &[(String, String)] {
        &self.table
    }

    /// Canonical value named by `text`, as a value or as a label.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        if let Some((_, value)) = self.table.iter().find(|(_, value)| *value == text) {
            return Some(value.as_str());
        }
        let key = normalize(&text);
        self.table
            .iter()
            .find(|(label, _)| normalize(label) == key)
            .map(|(_, value)| value.as_str())
    }

    /// Usage example listing every valid value.
    pub fn example<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Option<String> {
        let (_, pick) = self.table.choose(rng)?;
        let valid = self
            .table
            .iter()
            .map(|(_, value)| format!("{prefix}{value}"))
            .collect::<Vec<_>>()
            .join(" ");
        Some(format!("{prefix}{pick} (valid: {valid})"))
    }
}
