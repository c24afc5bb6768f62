//! Command routing for one catalog scope.
//!
//! A [`Module`] owns the commands of one game or catalog. Free text either
//! names a command in its first word, or is searched against every
//! command's primary pool at once; the section of the match picks the
//! command.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_foundation::{Error, ErrorKind, Result, tokenize};
use codex_pool::{Pool, PoolRegistry, SearchContext, SearchResult};
use serde::Deserialize;
use tracing::debug;

use crate::command::{ChoiceTables, Command, CommandSpec};
use crate::help::{HelpPage, HelpProvider};
use crate::parser::{Parsed, split_at_marker};

/// A module definition as written in JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ModuleSpec {
    /// Scope name, such as a game key
    pub name: String,
    /// Enumeration tables shared by the commands
    #[serde(default)]
    pub tables: ChoiceTables,
    /// Commands by name
    #[serde(default)]
    pub commands: BTreeMap<String, CommandSpec>,
}

/// Result of routing one line of free text.
#[derive(Debug)]
pub enum Route<'m> {
    /// A command was selected and its parse ran
    Parsed {
        /// The selected command
        command: &'m Command,
        /// Its parse
        parsed: Parsed,
    },
    /// The entity matched in several sections; a pick selects the command
    Pick(RoutePick),
}

/// A cross-section ambiguity waiting for a pick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePick {
    /// The full line being routed
    pub text: String,
    /// Matches across every primary pool
    pub search: SearchResult,
}

/// Commands of one scope.
#[derive(Clone, Debug)]
pub struct Module {
    name: String,
    commands: BTreeMap<String, Command>,
    sections: BTreeMap<String, String>,
    primary: Arc<Pool>,
}

impl Module {
    /// Groups `commands` under `name`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if two commands share a primary
    /// section or a name.
    pub fn new(name: impl Into<String>, commands: impl IntoIterator<Item = Command>) -> Result<Self> {
        let name = name.into();
        let mut by_name = BTreeMap::new();
        let mut sections = BTreeMap::new();

        for command in commands {
            let section = command.primary().section().to_string();
            if let Some(owner) = sections.insert(section.clone(), command.name().to_string()) {
                return Err(Error::configuration(format!(
                    "{name}: commands '{owner}' and '{}' share section '{section}'",
                    command.name()
                )));
            }
            if by_name.contains_key(command.name()) {
                return Err(Error::configuration(format!("{name}: duplicate command '{}'", command.name())));
            }
            by_name.insert(command.name().to_string(), command);
        }

        let primary = Arc::new(Pool::mix(
            name.as_str(),
            by_name.values().map(|command| Arc::as_ref(command.primary())),
        ));
        debug!(module = %name, commands = by_name.len(), entities = primary.len(), "module registered");

        Ok(Self {
            name,
            commands: by_name,
            sections,
            primary,
        })
    }

    /// Builds a module from its JSON definition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any command is invalid.
    pub fn from_spec(spec: &ModuleSpec, registry: &PoolRegistry) -> Result<Self> {
        let commands = spec
            .commands
            .iter()
            .map(|(name, command)| Command::from_spec(name, &spec.name, command, registry, &spec.tables))
            .collect::<Result<Vec<_>>>()?;
        Self::new(spec.name.as_str(), commands)
    }

    /// Scope name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command called `name`.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(&name.to_lowercase())
    }

    /// Every command, by name.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Routes one line of free text.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if nothing matches, or any error of the
    /// selected command's parse.
    pub fn route(&self, text: &str, ctx: &SearchContext) -> Result<Route<'_>> {
        let words = tokenize(text);
        if let [first, rest @ ..] = words.as_slice() {
            if let Some(command) = self.command(first).filter(|_| !rest.is_empty()) {
                let parsed = command.parse_free_text(&rest.join(" "), ctx)?;
                return Ok(Route::Parsed { command, parsed });
            }
        }

        let head = entity_phrase(text);
        let list = self.primary.search_list(&tokenize(head), Some(ctx));
        let Some(search) = list.search else {
            return Err(Error::not_found("name", head));
        };

        let first = search.first().map(|entity| entity.section.as_str());
        if search.finds.iter().all(|entity| Some(entity.section.as_str()) == first) {
            let command = self.section_command(first.unwrap_or_default())?;
            let parsed = command.parse_free_text(&self.trim_for(command, text), ctx)?;
            return Ok(Route::Parsed { command, parsed });
        }

        debug!(module = %self.name, query = %head, finds = search.len(), "match spans sections");
        Ok(Route::Pick(RoutePick {
            text: text.to_string(),
            search,
        }))
    }

    /// Continues a routed line once the entity `id` is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Abandoned`] if `id` is not a candidate, or any
    /// error of the selected command's parse.
    pub fn resume(&self, pick: RoutePick, id: &str, ctx: &SearchContext) -> Result<Route<'_>> {
        let chosen = pick.search.choose_id(id).ok_or_else(Error::abandoned)?;
        let section = chosen.first().map(|entity| entity.section.clone()).unwrap_or_default();
        let command = self.section_command(&section)?;
        let chosen = SearchResult::new(chosen.finds, section, chosen.text);
        let parsed = command.parse_text(&self.trim_for(command, &pick.text), ctx, Some(chosen))?;
        Ok(Route::Parsed { command, parsed })
    }

    /// Help page of command `name`.
    pub fn help<R: rand::Rng + ?Sized>(&self, name: &str, help: &dyn HelpProvider, rng: &mut R) -> Option<HelpPage> {
        self.command(name).map(|command| command.help(help, rng))
    }

    fn section_command(&self, section: &str) -> Result<&Command> {
        self.sections
            .get(section)
            .and_then(|name| self.commands.get(name))
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no command for section '{section}'"))))
    }

    /// Drops comparison or exclamation text the command cannot use.
    fn trim_for(&self, command: &Command, text: &str) -> String {
        let text = text.trim();
        let (head, tail) = match split_at_marker(text, ',') {
            Some((head, rest)) if command.comparison().is_none() => {
                debug!(module = %self.name, command = %command.name(), dropped = %rest, "comparison unsupported");
                (head.trim(), None)
            }
            Some((head, rest)) => (head.trim(), Some(rest)),
            None => (text, None),
        };
        let head = match split_at_marker(head, '!') {
            Some((dropped, rest)) if command.exclamation().is_none() => {
                debug!(module = %self.name, command = %command.name(), dropped = %dropped, "exclamation unsupported");
                rest.trim()
            }
            _ => head,
        };
        match tail {
            Some(tail) => format!("{head},{tail}"),
            None => head.to_string(),
        }
    }
}

/// Text that names the primary entity: before the first `,`, after its `!`.
fn entity_phrase(text: &str) -> &str {
    let text = text.trim();
    let text = split_at_marker(text, ',').map_or(text, |(head, _)| head.trim());
    split_at_marker(text, '!').map_or(text, |(_, rest)| rest.trim())
}

/// Parses a JSON array of module definitions and builds each module.
///
/// # Errors
///
/// Returns a serialization error for malformed JSON, or a configuration
/// error for an invalid module.
pub fn load_modules(json: &str, registry: &PoolRegistry) -> Result<Vec<Module>> {
    let specs: Vec<ModuleSpec> =
        serde_json::from_str(json).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
    specs.iter().map(|spec| Module::from_spec(spec, registry)).collect()
}
