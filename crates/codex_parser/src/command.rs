//! Command configuration.
//!
//! A [`Command`] owns one primary pool, its checks, and the free-text
//! markers that shape parsing. It is built once at registration, validated
//! there, and read-only afterwards. Configuration mistakes surface as
//! [`ErrorKind::Configuration`](codex_foundation::ErrorKind::Configuration)
//! so startup can abort.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use codex_foundation::{Error, Result};
use codex_pool::{Pool, PoolRegistry};
use serde::Deserialize;
use tracing::debug;

use crate::check::{Check, CheckKind};
use crate::params::ParameterTokenizer;
use crate::stdlib::{KeyAliases, STANDARD_KEY_ALIASES};

/// Key of the primary entity option.
pub const NAME_KEY: &str = "name";

/// Key of the level option.
pub const LEVEL_KEY: &str = "level";

/// Named enumeration tables shared by a module's commands.
pub type ChoiceTables = BTreeMap<String, BTreeMap<String, String>>;

/// Where an enumeration gets its `label -> value` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChoiceSource {
    /// Name of a shared table
    Table(String),
    /// Table written inline
    Inline(BTreeMap<String, String>),
}

/// Shape of the level option.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    /// One maximum per position
    Maxima(Vec<i64>),
    /// `size` positions sharing the maximum `lvl`
    Uniform {
        /// Number of positions
        size: usize,
        /// Shared maximum
        lvl: i64,
    },
}

impl LevelSpec {
    fn maxima(&self) -> Vec<i64> {
        match self {
            Self::Maxima(maxima) => maxima.clone(),
            Self::Uniform { size, lvl } => vec![*lvl; *size],
        }
    }
}

/// One or several keys.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeyList {
    /// A single key
    One(String),
    /// Several keys
    Many(Vec<String>),
}

impl KeyList {
    fn keys(&self) -> Vec<String> {
        match self {
            Self::One(key) => vec![key.clone()],
            Self::Many(keys) => keys.clone(),
        }
    }
}

/// Comma comparison settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Comparison {
    /// Option key holding the compared entries
    pub name: String,
    /// Most entries, the primary one included
    pub size: usize,
}

/// A command definition as written in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandSpec {
    /// Section of the primary pool
    pub main: String,
    /// Entity references: key to pool section
    pub entry: BTreeMap<String, String>,
    /// Flags: key to aliases
    #[serde(rename = "bool")]
    pub flags: BTreeMap<String, Vec<String>>,
    /// Bounded integers: key to `[min, max]`
    pub int: BTreeMap<String, [i64; 2]>,
    /// Enumerations
    pub choice: BTreeMap<String, ChoiceSource>,
    /// Lists: key to allowed values
    pub list: BTreeMap<String, Vec<String>>,
    /// Stat deltas: key to attributes
    pub stats: BTreeMap<String, Vec<String>>,
    /// Level sequence
    pub level: Option<LevelSpec>,
    /// Entry keys whose pools absorb leftover words
    #[serde(alias = "add")]
    pub attach: Option<KeyList>,
    /// Keys accumulating several values
    pub multiple: Vec<String>,
    /// Per-key start marker overrides
    pub prefix: BTreeMap<String, String>,
    /// Comma comparison
    pub comma: Option<Comparison>,
    /// Key receiving the text before `!`
    pub exclamation: Option<String>,
    /// Keys required on structured input
    pub required: Vec<String>,
    /// Extra key aliases
    #[serde(alias = "par")]
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// Leftover-word pools and the key each section feeds.
#[derive(Clone, Debug)]
pub(crate) struct Attach {
    pub(crate) pool: Arc<Pool>,
    pub(crate) keys: BTreeMap<String, String>,
}

/// A registered, validated command.
#[derive(Clone, Debug)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) scope: String,
    pub(crate) primary: Arc<Pool>,
    pub(crate) checks: Vec<Check>,
    pub(crate) attach: Option<Attach>,
    pub(crate) multiple: HashSet<String>,
    pub(crate) comma: Option<Comparison>,
    pub(crate) exclamation: Option<String>,
    pub(crate) required: Vec<String>,
    pub(crate) aliases: KeyAliases,
    pub(crate) tokenizer: ParameterTokenizer,
}

impl Command {
    /// Starts a builder for command `name` over `primary`.
    #[must_use]
    pub fn builder(name: impl Into<String>, primary: Arc<Pool>) -> CommandBuilder {
        CommandBuilder::new(name, primary)
    }

    /// Builds a command from its JSON definition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a pool section or enumeration table
    /// is missing, or if the definition is inconsistent.
    pub fn from_spec(
        name: &str,
        scope: &str,
        spec: &CommandSpec,
        registry: &PoolRegistry,
        tables: &ChoiceTables,
    ) -> Result<Self> {
        let context = |e: Error| match e.kind {
            codex_foundation::ErrorKind::Configuration(message) => {
                Error::configuration(format!("{scope}/{name}: {message}"))
            }
            _ => e,
        };

        let primary = registry.require(&spec.main).map_err(context)?;
        let mut builder = CommandBuilder::new(name, primary).scope(scope);

        // Declaration order: entry, bool, int, choice, list, stats, then level.
        for (key, section) in &spec.entry {
            builder = builder.check(Check::entry(key.as_str(), registry.require(section).map_err(context)?));
        }
        for (key, aliases) in &spec.flags {
            builder = builder
                .check(Check::flag(key.as_str()))
                .alias(key, aliases.iter().map(String::as_str));
        }
        for (key, [min, max]) in &spec.int {
            builder = builder.check(Check::int(key.as_str(), *min, *max));
        }
        for (key, source) in &spec.choice {
            let table = match source {
                ChoiceSource::Inline(table) => table,
                ChoiceSource::Table(table) => tables.get(table).ok_or_else(|| {
                    Error::configuration(format!("{scope}/{name}: choice '{key}' names missing table '{table}'"))
                })?,
            };
            builder = builder.check(Check::choice(
                key.as_str(),
                table.iter().map(|(label, value)| (label.as_str(), value.as_str())),
            ));
        }
        for (key, allowed) in &spec.list {
            builder = builder.check(Check::list(key.as_str(), allowed.iter().map(String::as_str)));
        }
        for (key, attributes) in &spec.stats {
            builder = builder.check(Check::stats(key.as_str(), attributes.iter().map(String::as_str)));
        }
        if let Some(level) = &spec.level {
            builder = builder.check(Check::level(LEVEL_KEY, level.maxima()));
        }

        if let Some(attach) = &spec.attach {
            for key in attach.keys() {
                builder = builder.attach(key);
            }
        }
        for key in &spec.multiple {
            builder = builder.multiple(key);
        }
        for (key, prefix) in &spec.prefix {
            builder = builder.prefix(key, prefix);
        }
        if let Some(comma) = &spec.comma {
            builder = builder.comma(&comma.name, comma.size);
        }
        if let Some(key) = &spec.exclamation {
            builder = builder.exclamation(key);
        }
        for key in &spec.required {
            builder = builder.required(key);
        }
        for (key, aliases) in &spec.aliases {
            builder = builder.alias(key, aliases.iter().map(String::as_str));
        }

        builder.build().map_err(context)
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope (module) the command belongs to.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The primary pool.
    #[must_use]
    pub fn primary(&self) -> &Arc<Pool> {
        &self.primary
    }

    /// Checks in matching order.
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// The check bound to `key`.
    #[must_use]
    pub fn check(&self, key: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.key() == key)
    }

    /// Comma comparison settings, if enabled.
    #[must_use]
    pub fn comparison(&self) -> Option<&Comparison> {
        self.comma.as_ref()
    }

    /// Key receiving exclamation text, if enabled.
    #[must_use]
    pub fn exclamation(&self) -> Option<&str> {
        self.exclamation.as_deref()
    }

    /// Returns true if `key` is fed by an attach pool.
    #[must_use]
    pub fn is_attached(&self, key: &str) -> bool {
        self.attach
            .as_ref()
            .is_some_and(|attach| attach.keys.values().any(|k| k == key))
    }

    /// Returns true if `key` accumulates several values.
    #[must_use]
    pub fn is_multiple(&self, key: &str) -> bool {
        self.multiple.contains(key)
    }

    /// Returns true if `key` must be supplied on structured input.
    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        key == NAME_KEY || self.required.iter().any(|k| k == key)
    }

    /// Canonical key for a free-text key.
    ///
    /// A key the command checks directly is never renamed.
    #[must_use]
    pub fn canonical_key<'a>(&'a self, key: &'a str) -> &'a str {
        if self.check(key).is_some() {
            return key;
        }
        self.aliases.canonical(key)
    }
}

/// Builder for [`Command`].
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    name: String,
    scope: String,
    primary: Arc<Pool>,
    checks: Vec<Check>,
    attach: Vec<String>,
    multiple: Vec<String>,
    prefixes: Vec<(String, String)>,
    comma: Option<Comparison>,
    exclamation: Option<String>,
    required: Vec<String>,
    aliases: KeyAliases,
}

impl CommandBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new(name: impl Into<String>, primary: Arc<Pool>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            scope: String::new(),
            primary,
            checks: Vec::new(),
            attach: Vec::new(),
            multiple: Vec::new(),
            prefixes: Vec::new(),
            comma: None,
            exclamation: None,
            required: Vec::new(),
            aliases: KeyAliases::new(),
        }
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Appends a check.
    #[must_use]
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Feeds leftover words matching `key`'s pool into `key`.
    #[must_use]
    pub fn attach(mut self, key: impl Into<String>) -> Self {
        self.attach.push(key.into());
        self
    }

    /// Lets `key` accumulate several values.
    #[must_use]
    pub fn multiple(mut self, key: impl Into<String>) -> Self {
        self.multiple.push(key.into());
        self
    }

    /// Overrides the start marker of `key`.
    #[must_use]
    pub fn prefix(mut self, key: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.push((key.into(), prefix.into()));
        self
    }

    /// Enables comma comparison.
    #[must_use]
    pub fn comma(mut self, name: impl Into<String>, size: usize) -> Self {
        self.comma = Some(Comparison {
            name: name.into(),
            size,
        });
        self
    }

    /// Stores text before `!` under `key`.
    #[must_use]
    pub fn exclamation(mut self, key: impl Into<String>) -> Self {
        self.exclamation = Some(key.into());
        self
    }

    /// Marks `key` as required on structured input.
    #[must_use]
    pub fn required(mut self, key: impl Into<String>) -> Self {
        self.required.push(key.into());
        self
    }

    /// Adds key aliases.
    #[must_use]
    pub fn alias<'a>(mut self, key: &'a str, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        self.aliases.merge([(key, aliases.into_iter().collect::<Vec<_>>())]);
        self
    }

    /// Validates and builds the command.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate check keys, prefixes or
    /// attach keys naming unknown or non-entry checks, attach pools sharing
    /// a section, or degenerate comparison and level settings.
    pub fn build(self) -> Result<Command> {
        let mut checks = self.checks;
        // The primary entry sits after the declared checks, the level last.
        let level_at = checks
            .iter()
            .position(|check| matches!(check.kind(), CheckKind::Level(_)));
        let name_check = Check::entry(NAME_KEY, Arc::clone(&self.primary));
        match level_at {
            Some(index) => checks.insert(index, name_check),
            None => checks.push(name_check),
        }

        let mut seen = HashSet::new();
        for check in &checks {
            if !seen.insert(check.key().to_string()) {
                return Err(Error::configuration(format!("duplicate option '{}'", check.key())));
            }
            match check.kind() {
                CheckKind::Level(level) if level.maxima().is_empty() => {
                    return Err(Error::configuration("level has no positions"));
                }
                CheckKind::Choice(choice) if choice.table().is_empty() => {
                    return Err(Error::configuration(format!(
                        "choice '{}' has an empty table",
                        check.key()
                    )));
                }
                _ => {}
            }
        }

        for (key, prefix) in self.prefixes {
            let check = checks
                .iter_mut()
                .find(|check| check.key() == key)
                .ok_or_else(|| Error::configuration(format!("prefix for unknown option '{key}'")))?;
            *check = check.clone().with_prefix(prefix);
        }

        let attach = build_attach(&checks, &self.attach)?;

        if let Some(comma) = &self.comma {
            if comma.size < 2 {
                return Err(Error::configuration("comparison size must be at least 2"));
            }
            if seen.contains(&comma.name) {
                return Err(Error::configuration(format!(
                    "comparison key '{}' collides with an option",
                    comma.name
                )));
            }
        }

        let mut aliases = self.aliases;
        aliases.merge(
            STANDARD_KEY_ALIASES
                .iter()
                .map(|(key, list)| (*key, list.iter().copied())),
        );

        let markers: Vec<String> = checks
            .iter()
            .filter_map(|check| check.prefix_override().map(String::from))
            .collect();
        let value_keys: Vec<String> = checks
            .iter()
            .filter(|check| check.declares_value())
            .flat_map(|check| {
                std::iter::once(check.key().to_string())
                    .chain(aliases.aliases_of(check.key()).iter().cloned())
            })
            .collect();
        let tokenizer = ParameterTokenizer::new(markers.iter().map(String::as_str), value_keys);

        debug!(
            command = %self.name,
            scope = %self.scope,
            checks = checks.len(),
            "command registered"
        );

        Ok(Command {
            name: self.name,
            scope: self.scope,
            primary: self.primary,
            checks,
            attach,
            multiple: self.multiple.into_iter().collect(),
            comma: self.comma,
            exclamation: self.exclamation,
            required: self.required,
            aliases,
            tokenizer,
        })
    }
}

fn build_attach(checks: &[Check], keys: &[String]) -> Result<Option<Attach>> {
    if keys.is_empty() {
        return Ok(None);
    }

    let mut sections: BTreeMap<String, String> = BTreeMap::new();
    let mut pools: Vec<Arc<Pool>> = Vec::new();
    for key in keys {
        let pool = checks
            .iter()
            .find(|check| check.key() == key)
            .and_then(Check::pool)
            .ok_or_else(|| Error::configuration(format!("attach key '{key}' is not an entry option")))?;
        if let Some(owner) = sections.insert(pool.section().to_string(), key.clone()) {
            return Err(Error::configuration(format!(
                "attach keys '{owner}' and '{key}' share section '{}'",
                pool.section()
            )));
        }
        pools.push(Arc::clone(pool));
    }

    let pool = match pools.as_slice() {
        [single] => Arc::clone(single),
        many => Arc::new(Pool::mix("attach", many.iter().map(AsRef::as_ref))),
    };
    Ok(Some(Attach { pool, keys: sections }))
}
