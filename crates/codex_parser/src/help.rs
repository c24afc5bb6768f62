//! Option declarations and help text.
//!
//! Help text never influences resolution. It feeds [`OptionDescriptor`]
//! descriptions and the pages rendered by `Command::help`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use codex_foundation::{Error, ErrorKind, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::check::Check;
use crate::command::{Command, NAME_KEY};

/// Type tag of a declared option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Free text (entities, enumerations, lists, stat deltas)
    Text,
    /// Integer
    Integer,
    /// Boolean
    Boolean,
}

/// One allowed value of an enumeration option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChoiceDescriptor {
    /// Label shown to users
    pub name: String,
    /// Canonical value
    pub value: String,
}

/// Machine-readable declaration of one structured option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionDescriptor {
    /// Option key
    pub name: String,
    /// Human description
    pub description: String,
    /// Type tag
    #[serde(rename = "type")]
    pub kind: OptionKind,
    /// Whether the option must be supplied
    pub required: bool,
    /// Allowed values, for enumerations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceDescriptor>,
}

impl OptionDescriptor {
    /// Creates an optional descriptor with no description.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            required: false,
            choices: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets whether the option is required.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the allowed values.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<ChoiceDescriptor>) -> Self {
        self.choices = choices;
        self
    }
}

/// Source of human-readable command and argument descriptions.
pub trait HelpProvider {
    /// Description of command `key` within `scope`, if known.
    fn command_text(&self, key: &str, scope: &str) -> Option<String>;

    /// Description of argument `key` within `scope`, if known.
    fn argument_text(&self, key: &str, scope: &str) -> Option<String>;

    /// Description of a command, or an empty string.
    fn command(&self, key: &str, scope: &str) -> String {
        self.command_text(key, scope).unwrap_or_else(|| {
            warn!(key, scope, "command help not found");
            String::new()
        })
    }

    /// Description of an argument, or an empty string.
    fn argument(&self, key: &str, scope: &str) -> String {
        self.argument_text(key, scope).unwrap_or_else(|| {
            warn!(key, scope, "argument help not found");
            String::new()
        })
    }
}

/// Help text loaded from JSON.
///
/// Scope-exclusive entries override the shared ones.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HelpText {
    #[serde(default)]
    command: BTreeMap<String, String>,
    #[serde(default)]
    args: BTreeMap<String, String>,
    #[serde(default)]
    exclusive_command: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    exclusive_args: BTreeMap<String, BTreeMap<String, String>>,
}

impl HelpText {
    /// Creates empty help text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses help text from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    /// Reads help text from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read help text '{}': {e}",
                path.as_ref().display()
            )))
        })?;
        Self::from_json(&text)
    }

    /// Adds shared command text.
    #[must_use]
    pub fn with_command(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.command.insert(key.into(), text.into());
        self
    }

    /// Adds shared argument text.
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.args.insert(key.into(), text.into());
        self
    }

    /// Adds argument text for one scope only.
    #[must_use]
    pub fn with_scoped_argument(
        mut self,
        scope: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.exclusive_args
            .entry(scope.into())
            .or_default()
            .insert(key.into(), text.into());
        self
    }
}

fn scoped(
    exclusive: &BTreeMap<String, BTreeMap<String, String>>,
    shared: &BTreeMap<String, String>,
    key: &str,
    scope: &str,
) -> Option<String> {
    exclusive
        .get(scope)
        .and_then(|texts| texts.get(key))
        .or_else(|| shared.get(key))
        .cloned()
}

impl HelpProvider for HelpText {
    fn command_text(&self, key: &str, scope: &str) -> Option<String> {
        scoped(&self.exclusive_command, &self.command, key, scope)
    }

    fn argument_text(&self, key: &str, scope: &str) -> Option<String> {
        scoped(&self.exclusive_args, &self.args, key, scope)
    }
}

/// One field of a help page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HelpField {
    /// Option key
    pub name: String,
    /// Description
    pub text: String,
    /// Usage example, if the option has one
    pub example: Option<String>,
}

/// A rendered help page for one command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HelpPage {
    /// Page title
    pub title: String,
    /// Command description
    pub description: String,
    /// Usage lines
    pub usage: Vec<String>,
    /// One field per option
    pub fields: Vec<HelpField>,
}

impl fmt::Display for HelpPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f)?;
        for line in &self.usage {
            writeln!(f, "  {line}")?;
        }
        for field in &self.fields {
            writeln!(f)?;
            writeln!(f, "{}: {}", field.name, field.text)?;
            if let Some(example) = &field.example {
                writeln!(f, "  ex. {example}")?;
            }
        }
        Ok(())
    }
}

impl Command {
    /// Declares every structured option.
    ///
    /// `name` comes first, then required options, then optional ones, then
    /// the comparison option when enabled.
    #[must_use]
    pub fn declare_options(&self, help: &dyn HelpProvider) -> Vec<OptionDescriptor> {
        let describe = |check: &Check| {
            check
                .describe_option()
                .with_description(help.argument(check.key(), &self.scope))
                .with_required(self.is_required(check.key()))
        };

        let mut declared: Vec<OptionDescriptor> = self
            .check(NAME_KEY)
            .map(describe)
            .into_iter()
            .collect();
        let others = self.checks.iter().filter(|check| check.key() != NAME_KEY);
        let (required, optional): (Vec<&Check>, Vec<&Check>) =
            others.partition(|check| self.is_required(check.key()));
        declared.extend(required.into_iter().chain(optional).map(describe));

        if let Some(comma) = self.comparison() {
            declared.push(
                OptionDescriptor::new(comma.name.clone(), OptionKind::Text)
                    .with_description(help.argument(&comma.name, &self.scope)),
            );
        }
        declared
    }

    /// Renders the help page, drawing examples from `rng`.
    pub fn help<R: Rng + ?Sized>(&self, help: &dyn HelpProvider, rng: &mut R) -> HelpPage {
        let section = self.primary.section();
        let mut usage = vec![format!("{} <{section}> [options]", self.name)];
        if let Some(attach) = &self.attach {
            let keys: Vec<String> = attach.keys.values().map(|key| format!("[{key}]")).collect();
            usage.push(format!("{} <{section}> {}", self.name, keys.join(" ")));
        }
        if let Some(comma) = self.comparison() {
            usage.push(format!("{} <{section}>, <{section}>... (up to {})", self.name, comma.size));
        }
        if let Some(key) = self.exclamation() {
            usage.push(format!("{} [{key}]!<{section}>", self.name));
        }

        let fields = self
            .checks
            .iter()
            .map(|check| {
                let example = if check.key() == NAME_KEY {
                    self.primary
                        .random_pick(rng)
                        .map(|entity| entity.short_display().to_string())
                } else {
                    check.example(rng)
                };
                HelpField {
                    name: check.key().to_string(),
                    text: help.argument(check.key(), &self.scope),
                    example,
                }
            })
            .collect();

        HelpPage {
            title: format!("{} | {}", self.scope.to_uppercase(), self.name),
            description: help.command(&self.name, &self.scope),
            usage,
            fields,
        }
    }
}
