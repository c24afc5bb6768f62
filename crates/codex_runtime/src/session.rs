//! Session state management.
//!
//! A [`Session`] holds everything loaded at startup (pools, modules, help
//! text, the alias store) plus the per-user settings the REPL can change.
//! Each line is evaluated into an [`Outcome`]; picks go through whatever
//! [`Disambiguator`] the caller supplies.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use codex_foundation::{Error, ErrorContext, ErrorKind, Result};
use codex_parser::{
    Disambiguator, HelpProvider, HelpText, InputValue, Module, OptionMap, PickRequest, PickResponse, Route,
    load_modules, resolve,
};
use codex_pool::{AliasScope, JsonCatalog, PoolRegistry, SearchContext};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{EngineConfig, RuntimeConfig};
use crate::store::AliasStore;

/// Meta commands understood by [`Session::eval`].
pub const META_COMMANDS: &[&str] = &[":help", ":options", ":alias", ":random", ":module", ":json", ":quit"];

/// What evaluating one line produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A command resolved to its final option map.
    Resolved {
        /// Command name
        command: String,
        /// Final options
        options: OptionMap,
        /// Words no check claimed
        unmatched: Vec<String>,
    },
    /// Text for the user.
    Message(String),
    /// A pick timed out or was refused; nothing runs.
    Abandoned,
    /// The user asked to leave.
    Quit,
}

#[derive(Serialize)]
struct Rendered<'a> {
    command: &'a str,
    options: &'a OptionMap,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    unmatched: &'a [String],
}

impl Outcome {
    /// Renders the outcome for display; resolved options become JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the options cannot be encoded.
    pub fn render(&self) -> Result<Option<String>> {
        match self {
            Self::Resolved {
                command,
                options,
                unmatched,
            } => {
                let rendered = Rendered {
                    command,
                    options,
                    unmatched,
                };
                serde_json::to_string_pretty(&rendered)
                    .map(Some)
                    .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
            }
            Self::Message(text) => Ok(Some(text.clone())),
            Self::Abandoned | Self::Quit => Ok(None),
        }
    }
}

/// State of one interactive session.
pub struct Session {
    modules: Vec<Module>,
    active: usize,
    help: HelpText,
    store: AliasStore,
    config: EngineConfig,
    user: AliasScope,
    group: AliasScope,
}

impl Session {
    /// Creates a session over already built modules.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `modules` is empty.
    pub fn new(modules: Vec<Module>, help: HelpText, store: AliasStore, config: EngineConfig) -> Result<Self> {
        if modules.is_empty() {
            return Err(Error::configuration("no modules defined"));
        }
        Ok(Self {
            modules,
            active: 0,
            help,
            store,
            config,
            user: AliasScope::User("local".into()),
            group: AliasScope::Group("local".into()),
        })
    }

    /// Loads catalog, modules, help text and aliases named by `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required file is not given or a
    /// definition is invalid, or an I/O error if a file cannot be read.
    pub fn load(config: &RuntimeConfig) -> Result<Self> {
        let catalog_path = config
            .catalog
            .as_ref()
            .ok_or_else(|| Error::configuration("--catalog is required"))?;
        let modules_path = config
            .modules
            .as_ref()
            .ok_or_else(|| Error::configuration("--modules is required"))?;

        let registry = PoolRegistry::load(&JsonCatalog::load(catalog_path)?)?;
        let modules = load_modules(&read_file(modules_path)?, &registry)?;
        let help = match &config.help_text {
            Some(path) => HelpText::load(path)?,
            None => HelpText::new(),
        };
        let store = match &config.aliases {
            Some(path) => AliasStore::open(path)?,
            None => AliasStore::in_memory(),
        };

        info!(
            sections = registry.sections().count(),
            modules = modules.len(),
            "catalog loaded"
        );
        Ok(Self::new(modules, help, store, config.engine.clone())?
            .with_user(config.user())
            .with_group(config.scope()))
    }

    /// Sets the user whose aliases apply.
    #[must_use]
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = AliasScope::User(user.to_string());
        self
    }

    /// Sets the group whose aliases apply.
    #[must_use]
    pub fn with_group(mut self, group: &str) -> Self {
        self.group = AliasScope::Group(group.to_string());
        self
    }

    /// Engine configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The alias store.
    #[must_use]
    pub const fn store(&self) -> &AliasStore {
        &self.store
    }

    /// The module free text is routed through.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.modules[self.active]
    }

    /// Words worth completing: meta commands, then command names.
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        META_COMMANDS
            .iter()
            .map(|meta| (*meta).to_string())
            .chain(self.module().commands().map(|command| command.name().to_string()))
            .collect()
    }

    /// Builds the search context of one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored alias cannot be compiled.
    pub fn context(&self) -> Result<SearchContext> {
        Ok(SearchContext::from_source(&self.store, Some(&self.user), Some(&self.group))?
            .with_random(self.config.allow_random))
    }

    /// Evaluates one line of input.
    ///
    /// # Errors
    ///
    /// Returns the parse error of a command, or the error of a meta command.
    pub fn eval(&mut self, line: &str, picker: &mut dyn Disambiguator) -> Result<Outcome> {
        let line = line.trim();
        if let Some(meta) = line.strip_prefix(':') {
            return self.eval_meta(meta, picker);
        }

        let ctx = self.context()?;
        let module = self.module();
        let (command, parsed) = match module.route(line, &ctx)? {
            Route::Parsed { command, parsed } => (command, parsed),
            Route::Pick(pick) => {
                let (shown, overflow) = pick.search.candidates(self.config.pick_cap);
                let request = PickRequest {
                    key: codex_parser::NAME_KEY.to_string(),
                    text: pick.search.text.clone(),
                    candidates: shown.to_vec(),
                    overflow,
                };
                let PickResponse::Chosen(id) = picker.pick(&request) else {
                    debug!(query = %line, "routing pick abandoned");
                    return Ok(Outcome::Abandoned);
                };
                match module.resume(pick, &id, &ctx) {
                    Ok(Route::Parsed { command, parsed }) => (command, parsed),
                    Ok(Route::Pick(_)) => return Err(Error::internal("resumed route asked for another pick")),
                    Err(e) if matches!(e.kind, ErrorKind::Abandoned) => return Ok(Outcome::Abandoned),
                    Err(e) => return Err(e),
                }
            }
        };

        let unmatched = parsed.unmatched.clone();
        finish(command.name(), resolve(parsed, picker, self.config.pick_cap), unmatched)
    }

    fn eval_meta(&mut self, meta: &str, picker: &mut dyn Disambiguator) -> Result<Outcome> {
        let (name, rest) = meta.split_once(char::is_whitespace).unwrap_or((meta, ""));
        let rest = rest.trim();

        match name {
            "q" | "quit" | "exit" => Ok(Outcome::Quit),
            "help" | "h" => self.meta_help(rest),
            "options" => self.meta_options(rest),
            "alias" => self.meta_alias(rest),
            "random" => self.meta_random(rest),
            "module" => self.meta_module(rest),
            "json" => self.meta_json(rest, picker),
            other => Err(Error::configuration(format!("unknown meta command ':{other}'"))),
        }
    }

    fn meta_help(&self, rest: &str) -> Result<Outcome> {
        let module = self.module();
        if rest.is_empty() {
            let mut text = format!("Module {}\n\nCommands:\n", module.name());
            for command in module.commands() {
                let _ = writeln!(
                    text,
                    "  {:<12} {}",
                    command.name(),
                    self.help.command(command.name(), module.name())
                );
            }
            text.push_str(
                "\nMeta commands:\n  :help [command]  :options <command>  :alias user|scope add|list|remove\n  \
                 :random on|off  :module [name]  :json <command> <object>  :quit",
            );
            return Ok(Outcome::Message(text));
        }

        module
            .help(rest, &self.help, &mut rand::thread_rng())
            .map(|page| Outcome::Message(page.to_string().trim_end().to_string()))
            .ok_or_else(|| unknown_command(rest))
    }

    fn meta_options(&self, rest: &str) -> Result<Outcome> {
        let command = self.module().command(rest).ok_or_else(|| unknown_command(rest))?;
        let declared = command.declare_options(&self.help);
        serde_json::to_string_pretty(&declared)
            .map(Outcome::Message)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    fn meta_alias(&self, rest: &str) -> Result<Outcome> {
        let usage = || Error::configuration("usage: :alias user|scope add <original> = <alias> | list | remove <n>");

        let mut words = rest.splitn(3, char::is_whitespace);
        let scope = match words.next() {
            Some("user") => &self.user,
            Some("scope" | "group" | "server") => &self.group,
            _ => return Err(usage()),
        };
        let action = words.next().unwrap_or("list");
        let args = words.next().unwrap_or("").trim();

        match action {
            "list" => {
                let records = self.store.list(scope)?;
                if records.is_empty() {
                    return Ok(Outcome::Message("No aliases.".into()));
                }
                let mut text = String::new();
                for (index, record) in records.iter().enumerate() {
                    let _ = writeln!(text, "{}. {} -> {}", index + 1, record.alias.display, record.original.display);
                }
                Ok(Outcome::Message(text.trim_end().to_string()))
            }
            "add" => {
                let (original, alias) = args.split_once('=').ok_or_else(usage)?;
                let record = self.store.add(scope, original.trim(), alias.trim())?;
                Ok(Outcome::Message(format!(
                    "Added {} -> {}",
                    record.alias.display, record.original.display
                )))
            }
            "remove" | "rm" => {
                let index = args.parse().map_err(|_| usage())?;
                let record = self.store.remove(scope, index)?;
                Ok(Outcome::Message(format!(
                    "Removed {} -> {}",
                    record.alias.display, record.original.display
                )))
            }
            _ => Err(usage()),
        }
    }

    fn meta_random(&mut self, rest: &str) -> Result<Outcome> {
        match rest {
            "on" => self.config.allow_random = true,
            "off" => self.config.allow_random = false,
            "" => {}
            _ => return Err(Error::configuration("usage: :random on|off")),
        }
        let state = if self.config.allow_random { "on" } else { "off" };
        Ok(Outcome::Message(format!("Random picks are {state}.")))
    }

    fn meta_module(&mut self, rest: &str) -> Result<Outcome> {
        if !rest.is_empty() {
            self.active = self
                .modules
                .iter()
                .position(|module| module.name().eq_ignore_ascii_case(rest))
                .ok_or_else(|| Error::configuration(format!("unknown module '{rest}'")))?;
        }
        let names: Vec<&str> = self.modules.iter().map(Module::name).collect();
        Ok(Outcome::Message(format!(
            "Active module: {} (available: {})",
            self.module().name(),
            names.join(", ")
        )))
    }

    fn meta_json(&self, rest: &str, picker: &mut dyn Disambiguator) -> Result<Outcome> {
        let (name, body) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::configuration("usage: :json <command> <object>"))?;
        let command = self.module().command(name).ok_or_else(|| unknown_command(name))?;
        let input: BTreeMap<String, InputValue> = serde_json::from_str(body.trim()).map_err(|e| {
            Error::new(ErrorKind::Serialization(e.to_string()))
                .with_context(ErrorContext::new().with_command(name).with_scope(self.module().name()))
        })?;

        let parsed = command.parse_structured(input, &self.context()?, self.config.strict)?;
        finish(command.name(), resolve(parsed, picker, self.config.pick_cap), Vec::new())
    }
}

fn finish(command: &str, resolved: Result<OptionMap>, unmatched: Vec<String>) -> Result<Outcome> {
    match resolved {
        Ok(options) => Ok(Outcome::Resolved {
            command: command.to_string(),
            options,
            unmatched,
        }),
        Err(e) if matches!(e.kind, ErrorKind::Abandoned) => Ok(Outcome::Abandoned),
        Err(e) => Err(e),
    }
}

fn unknown_command(name: &str) -> Error {
    Error::configuration(format!("unknown command '{name}'"))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::new(ErrorKind::Io(format!("failed to read '{}': {e}", path.display()))))
}
