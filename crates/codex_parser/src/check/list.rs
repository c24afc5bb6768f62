//! Multi-value lists.

use rand::Rng;
use rand::seq::SliceRandom;

/// A fixed set of allowed values collected into an ordered list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListCheck {
    allowed: Vec<String>,
}

impl ListCheck {
    /// Creates a check over `allowed`.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|v| v.into().to_lowercase()).collect(),
        }
    }

    /// Allowed values in declaration order.
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Returns true if `value` is allowed.
    #[must_use]
    pub fn allows(&self, value: &str) -> bool {
        self.allowed.iter().any(|v| v == value)
    }

    /// Allowed values in `text` (comma separated), first-seen order, no repeats.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for piece in text.split(',') {
            let piece = piece.trim().to_lowercase();
            if self.allows(&piece) && !out.contains(&piece) {
                out.push(piece);
            }
        }
        out
    }

    /// Usage example listing every valid value.
    pub fn example<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Option<String> {
        let pick = self.allowed.choose(rng)?;
        let valid = self
            .allowed
            .iter()
            .map(|value| format!("{prefix}{value}"))
            .collect::<Vec<_>>()
            .join(" ");
        Some(format!("{prefix}{pick} (valid: {valid})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dedupes_in_first_seen_order() {
        let check = ListCheck::new(["a", "b", "c"]);
        assert_eq!(check.parse("a,b,a,c"), ["a", "b", "c"]);
        assert_eq!(check.parse(" C , x, a "), ["c", "a"]);
        assert!(check.parse("x,y").is_empty());
    }
}
