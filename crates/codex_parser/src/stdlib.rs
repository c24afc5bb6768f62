//! Standard key aliases shared by every command.
//!
//! A token key found in an alias list is renamed to the canonical key
//! before check matching, so `-strength` and `-str` reach the same check.

/// Canonical key followed by its aliases.
pub const STANDARD_KEY_ALIASES: &[(&str, &[&str])] = &[
    ("personal", &["base"]),
    ("secret", &["sickomode", "sicko"]),
    ("class", &["job"]),
    ("hp", &["health", "robust", "sickly"]),
    ("atk", &["attack"]),
    ("str", &["strength", "strong", "weak"]),
    ("mag", &["magic", "clever", "dull"]),
    ("def", &["defence", "defense", "sturdy", "fragile"]),
    ("lck", &["luck", "lucky", "unlucky"]),
    ("res", &["resistance", "calm", "excitable"]),
    ("spd", &["speed", "quick", "slow"]),
    ("skl", &["skill", "deft", "clumsy"]),
    ("level", &["lvl", "lv"]),
    ("lunatic", &["lm", "lunaticmode"]),
    ("hard", &["hm", "hardmode"]),
    ("normal", &["nm", "normalmode"]),
    ("maniac", &["mm", "maniacmode"]),
    ("maddening", &["mm", "maddeningmode"]),
];

/// Ordered key alias table for one command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyAliases {
    entries: Vec<(String, Vec<String>)>,
}

impl KeyAliases {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard table.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.merge(
            STANDARD_KEY_ALIASES
                .iter()
                .map(|(key, aliases)| (*key, aliases.iter().copied())),
        );
        table
    }

    /// Adds aliases; an existing key gains the aliases it lacks.
    pub fn merge<'a, A>(&mut self, entries: impl IntoIterator<Item = (&'a str, A)>)
    where
        A: IntoIterator<Item = &'a str>,
    {
        for (key, aliases) in entries {
            let key = key.to_lowercase();
            let index = match self.entries.iter().position(|(k, _)| *k == key) {
                Some(index) => index,
                None => {
                    self.entries.push((key, Vec::new()));
                    self.entries.len() - 1
                }
            };
            let list = &mut self.entries[index].1;
            for alias in aliases {
                let alias = alias.to_lowercase();
                if !list.contains(&alias) {
                    list.push(alias);
                }
            }
        }
    }

    /// The canonical key for `key`; the first table entry listing it wins.
    #[must_use]
    pub fn canonical<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| alias == key))
            .map_or(key, |(canonical, _)| canonical.as_str())
    }

    /// Aliases of `key`, if any.
    #[must_use]
    pub fn aliases_of(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or_default()
    }
}
