//! Codex CLI entry point.

use std::env;
use std::process::ExitCode;

use codex_runtime::{Repl, RuntimeConfig, Session, parse_args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("codex {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(&config)?;

    let session = Session::load(&config)?;
    let mut repl = Repl::new(session)?;

    if !config.eval.is_empty() {
        repl.eval_batch(config.eval.iter().map(String::as_str))?;
        return Ok(());
    }

    repl.run()?;
    Ok(())
}

fn init_logging(config: &RuntimeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match &config.log {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mCodex\x1b[0m - Entity resolution for game-catalog queries

\x1b[1mUSAGE:\x1b[0m
    codex --catalog <FILE> --modules <FILE> [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help             Print help information
    -V, --version          Print version information
    --catalog FILE         Catalog JSON (sections of entity records)
    --modules FILE         Module and command definitions JSON
    --help-text FILE       Command and argument descriptions JSON
    --aliases FILE         Alias store (created on first write)
    --user NAME            User whose aliases apply (default: local)
    --scope NAME           Group whose aliases apply (default: local)
    --strict               Fail structured input on malformed values
    --no-random            Disable the `random` keyword
    --pick-cap N           Candidates shown per pick (default: 25)
    --pick-timeout SECS    Seconds to wait for a pick (default: 60)
    --log FILTER           Log filter, overriding RUST_LOG
    -e, --eval LINE        Evaluate LINE and exit (repeatable)

\x1b[1mEXAMPLES:\x1b[0m
    codex --catalog fe.json --modules modules.json
    codex --catalog fe.json --modules modules.json -e 'marth +str5 lvl 1/5/10'
    codex --catalog fe.json --modules modules.json --aliases aliases.msgpack --user ike

\x1b[1mREPL COMMANDS:\x1b[0m
    <text>                          Resolve free text against the active module
    :help [command]                 List commands, or show a command's help page
    :options <command>              Declare a command's options as JSON
    :json <command> <object>        Resolve already keyed options
    :alias user|scope add A = B     Make B an alias of A
    :alias user|scope list          List aliases
    :alias user|scope remove N      Remove the Nth alias
    :random on|off                  Allow or refuse random picks
    :module [name]                  Show or switch the active module
    :quit                           Exit (also Ctrl+D)"
    );
}
