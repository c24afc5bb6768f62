//! Ordered numeric sequences (`1/5/10`).

use rand::Rng;

/// A fixed-length sequence with a maximum per position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCheck {
    maxima: Vec<i64>,
}

impl LevelCheck {
    /// Creates a check with one maximum per position.
    #[must_use]
    pub fn new(maxima: Vec<i64>) -> Self {
        Self { maxima }
    }

    /// Creates a check of `size` positions sharing one maximum.
    #[must_use]
    pub fn uniform(size: usize, max: i64) -> Self {
        Self::new(vec![max; size])
    }

    /// Per-position maxima.
    #[must_use]
    pub fn maxima(&self) -> &[i64] {
        &self.maxima
    }

    /// Parses a `/` or space separated run, skipping non-numbers.
    ///
    /// Values are clamped to `[1, max]` of their position and parsing stops
    /// once every position is filled.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.maxima.len());
        for piece in text.split(['/', ' ']) {
            let Some(&max) = self.maxima.get(out.len()) else {
                break;
            };
            if let Ok(value) = piece.trim().parse::<i64>() {
                out.push(value.clamp(1, max.max(1)));
            }
        }
        out
    }

    /// Clamps each value to its position and drops any past the last one.
    #[must_use]
    pub fn fit(&self, values: &[i64]) -> Vec<i64> {
        values
            .iter()
            .zip(&self.maxima)
            .map(|(value, max)| (*value).clamp(1, (*max).max(1)))
            .collect()
    }

    /// Usage example of up to three non-increasing levels.
    pub fn example<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        if self.maxima.is_empty() {
            return None;
        }
        let mut last = i64::MAX;
        let text = self
            .maxima
            .iter()
            .take(3)
            .map(|max| {
                last = last.min(rng.gen_range(1..=(*max).max(1)));
                last.to_string()
            })
            .collect::<Vec<_>>()
            .join("/");
        Some(text)
    }
}
