//! Numeric-delta sets (`str+5`, `def-3`, `spd=20`).

use rand::Rng;

use crate::value::{OptionUpdate, StatOp};

/// Largest accepted delta magnitude.
pub const STAT_LIMIT: i64 = 99;

/// Meta-attributes that apply a delta to every boosted attribute.
pub const SPECTRUM: &[&str] = &["spec", "spectrum"];

/// Attributes a spectrum delta reaches (never hp).
const SPECTRUM_BOOST: &[&str] = &["str", "mag", "atk", "skl", "lck", "spd", "def", "res", "dex"];

const OPERATORS: [char; 3] = ['+', '-', '='];

/// One parsed stat token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatToken {
    /// Attribute or meta-attribute
    pub attribute: String,
    /// Bucket
    pub op: StatOp,
    /// Clamped, signed amount
    pub amount: i64,
}

/// Recognises `<attribute><op><integer>` tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsCheck {
    attributes: Vec<String>,
}

impl StatsCheck {
    /// Creates a check over `attributes`.
    #[must_use]
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|a| a.into().to_lowercase())
                .collect(),
        }
    }

    /// Configured attributes, without the meta-attributes.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn knows(&self, attribute: &str) -> bool {
        SPECTRUM.contains(&attribute) || self.attributes.iter().any(|a| a == attribute)
    }

    /// Parses one token.
    ///
    /// An operator inside the token wins. Otherwise `marker` (the start
    /// marker the token came with) is used as the operator, so `+str5` and
    /// `-def3` read as `str+5` and `def-3`.
    #[must_use]
    pub fn parse(&self, token: &str, marker: Option<char>) -> Option<StatToken> {
        let token = token.trim().to_lowercase();

        for op in OPERATORS {
            let Some((attribute, amount)) = token.split_once(op) else {
                continue;
            };
            let attribute = attribute.trim();
            if self.knows(attribute) {
                if let Ok(amount) = amount.trim().parse::<i64>() {
                    return Some(stat_token(attribute, op, amount));
                }
            }
        }

        let op = marker.filter(|m| OPERATORS.contains(m))?;
        let split = token.find(|ch: char| ch.is_ascii_digit())?;
        let (attribute, amount) = token.split_at(split);
        if !self.knows(attribute) {
            return None;
        }
        let amount = amount.parse::<i64>().ok()?;
        Some(stat_token(attribute, op, amount))
    }

    /// Returns true if `token` is a stat token on its own.
    #[must_use]
    pub fn is_stat(&self, token: &str) -> bool {
        self.parse(token, None).is_some()
    }

    /// Updates for one parsed token, expanding meta-attributes.
    #[must_use]
    pub fn updates(&self, key: &str, token: &StatToken) -> Vec<OptionUpdate> {
        let update = |attribute: &str| OptionUpdate::Stat {
            key: key.to_string(),
            op: token.op,
            attribute: attribute.to_string(),
            amount: token.amount,
        };

        if !SPECTRUM.contains(&token.attribute.as_str()) {
            return vec![update(&token.attribute)];
        }

        let split_attack = self.has("str") || self.has("mag");
        SPECTRUM_BOOST
            .iter()
            .filter(|stat| self.has(stat))
            .filter(|stat| **stat != "atk" || !split_attack)
            .map(|stat| update(stat))
            .collect()
    }

    fn has(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    /// Parses a comma or space separated list of tokens.
    #[must_use]
    pub fn parse_list(&self, text: &str) -> Vec<StatToken> {
        text.split([',', ' '])
            .filter(|piece| !piece.trim().is_empty())
            .filter_map(|piece| self.parse(piece, None))
            .collect()
    }

    /// Usage example such as `-str+5 -mag-5 -skl=5`.
    pub fn example<R: Rng + ?Sized>(&self, prefix: &str, rng: &mut R) -> Option<String> {
        if self.attributes.is_empty() {
            return None;
        }
        let text = self
            .attributes
            .iter()
            .zip(OPERATORS)
            .map(|(attribute, op)| format!("{prefix}{attribute}{op}{}", rng.gen_range(1..=10)))
            .collect::<Vec<_>>()
            .join(" ");
        Some(text)
    }
}

fn stat_token(attribute: &str, op: char, amount: i64) -> StatToken {
    let (op, sign) = StatOp::from_char(op).unwrap_or((StatOp::Add, 1));
    StatToken {
        attribute: attribute.to_string(),
        op,
        amount: amount.clamp(-STAT_LIMIT, STAT_LIMIT) * sign,
    }
}
