//! Bounded integers.

use rand::Rng;

/// An integer clamped into `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntCheck {
    min: i64,
    max: i64,
}

impl IntCheck {
    /// Creates a check; the bounds are swapped if given in reverse.
    #[must_use]
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Clamps `value` into range.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }

    /// Parses and clamps `text`; `None` if it is not an integer.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<i64> {
        text.trim().parse::<i64>().ok().map(|value| self.clamp(value))
    }

    /// Usage example such as `-7`.
    pub fn example<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> String {
        let low = self.min.saturating_add(1).min(self.max);
        format!("{prefix}{}", rng.gen_range(low..=self.max))
    }
}
