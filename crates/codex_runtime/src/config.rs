//! Engine and command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use codex_foundation::{Error, Result};
use codex_parser::DEFAULT_PICK_CAP;

/// Knobs of the resolution engine.
///
/// Controls disambiguation, structured validation, and random picks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Most candidates shown in one disambiguation prompt.
    pub pick_cap: usize,

    /// How long a disambiguation prompt waits for an answer.
    pub pick_timeout: Duration,

    /// Fail structured input on the first malformed value instead of dropping it.
    pub strict: bool,

    /// Whether the `random` keyword may pick an entity.
    pub allow_random: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pick_cap: DEFAULT_PICK_CAP,
            pick_timeout: Duration::from_secs(60),
            strict: false,
            allow_random: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration that rejects malformed input and random picks.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            allow_random: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with short prompts and a fast timeout.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            pick_cap: 10,
            pick_timeout: Duration::from_secs(15),
            ..Self::default()
        }
    }

    /// Builder method to set the candidate cap.
    #[must_use]
    pub fn with_pick_cap(mut self, cap: usize) -> Self {
        self.pick_cap = cap.max(1);
        self
    }

    /// Builder method to set the disambiguation timeout.
    #[must_use]
    pub fn with_pick_timeout(mut self, timeout: Duration) -> Self {
        self.pick_timeout = timeout;
        self
    }

    /// Builder method to enable/disable strict structured validation.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builder method to allow/forbid random picks.
    #[must_use]
    pub fn with_random(mut self, allow: bool) -> Self {
        self.allow_random = allow;
        self
    }
}

/// Settings of one `codex` process, parsed from its arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Catalog JSON file
    pub catalog: Option<PathBuf>,
    /// Module definitions JSON file
    pub modules: Option<PathBuf>,
    /// Help text JSON file
    pub help_text: Option<PathBuf>,
    /// Alias store file; aliases stay in memory without one
    pub aliases: Option<PathBuf>,
    /// User whose aliases apply
    pub user: Option<String>,
    /// Group whose aliases apply
    pub scope: Option<String>,
    /// Log filter directive, overriding `RUST_LOG`
    pub log: Option<String>,
    /// Lines evaluated instead of starting the REPL
    pub eval: Vec<String>,
    /// Engine knobs
    pub engine: EngineConfig,
    /// Print usage and exit
    pub show_help: bool,
    /// Print the version and exit
    pub show_version: bool,
}

impl RuntimeConfig {
    /// The user name, `local` when unset.
    #[must_use]
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or("local")
    }

    /// The group name, `local` when unset.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.scope.as_deref().unwrap_or("local")
    }
}

/// Parses process arguments; `args[0]` is the program name.
///
/// # Errors
///
/// Returns a configuration error for an unknown option, a missing value, or
/// a stray positional argument.
pub fn parse_args(args: &[String]) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| Error::configuration(format!("{flag} requires a value")))
        };

        match flag {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--strict" => config.engine.strict = true,
            "--no-random" => config.engine.allow_random = false,
            "--catalog" => config.catalog = Some(PathBuf::from(value()?)),
            "--modules" => config.modules = Some(PathBuf::from(value()?)),
            "--help-text" => config.help_text = Some(PathBuf::from(value()?)),
            "--aliases" => config.aliases = Some(PathBuf::from(value()?)),
            "--user" => config.user = Some(value()?),
            "--scope" => config.scope = Some(value()?),
            "--log" => config.log = Some(value()?),
            "-e" | "--eval" => config.eval.push(value()?),
            "--pick-cap" => {
                let raw = value()?;
                let cap = raw
                    .parse()
                    .map_err(|_| Error::configuration(format!("invalid --pick-cap value: {raw}")))?;
                config.engine = config.engine.with_pick_cap(cap);
            }
            "--pick-timeout" => {
                let raw = value()?;
                let secs = raw
                    .parse()
                    .map_err(|_| Error::configuration(format!("invalid --pick-timeout value: {raw}")))?;
                config.engine.pick_timeout = Duration::from_secs(secs);
            }
            arg if arg.starts_with('-') => {
                return Err(Error::configuration(format!("unknown option: {arg}")));
            }
            arg => return Err(Error::configuration(format!("unexpected argument: {arg}"))),
        }
        i += 1;
    }

    Ok(config)
}
