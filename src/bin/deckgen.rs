//! deckgen command-line binary.
//!
//! Usage: `deckgen [--db PATH] [--allocation FILE] <COMMAND> [ARGS]`
//!
//! Every command prints JSON to stdout.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use deckgen::storage::open_database;
use deckgen::{
    AllocationConfig, CardId, ColorIdentity, CommanderFilter, DeckConstraints, DeckResult,
    DeckRuntime, DeckRuntimeConfig, DeckService, DEFAULT_MAX_PRICE,
};

const USAGE: &str = "\
deckgen - Budget-constrained Commander deck generator

USAGE:
    deckgen [OPTIONS] <COMMAND>

COMMANDS:
    generate <ID>...     Build a deck for each commander id
    card <ID>            Show one card
    search <TERM>        Find cards by name
    commanders           List commander-eligible cards

OPTIONS:
    -d, --db <PATH>            SQLite card database [default: ./mtg_cards.db]
    -a, --allocation <FILE>    Allocation config (JSON)
    -m, --max-price <USD>      Price ceiling for generate [default: 1000000]
        --power-level <N>      Power level hint for generate
        --strategy <TEXT>      Strategy hint for generate
    -w, --workers <N>          Parallel builds for generate [default: 4]
    -n, --name <TEXT>          Name filter for commanders
    -c, --colors <WUBRG>       Required colors for commanders
    -l, --limit <N>            Page size for search and commanders [default: 50]
    -o, --offset <N>           Page offset for search and commanders [default: 0]
    -h, --help                 Print help information

Logging is controlled with RUST_LOG, e.g. RUST_LOG=deckgen=debug";

enum Command {
    Generate(Vec<CardId>),
    Card(CardId),
    Search(String),
    Commanders,
}

/// CLI configuration
struct Config {
    db_path: PathBuf,
    allocation: Option<PathBuf>,
    constraints: DeckConstraints,
    workers: usize,
    name: Option<String>,
    colors: ColorIdentity,
    limit: usize,
    offset: usize,
    command: Option<Command>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./mtg_cards.db"),
            allocation: None,
            constraints: DeckConstraints::new(DEFAULT_MAX_PRICE),
            workers: DeckRuntimeConfig::default().workers,
            name: None,
            colors: ColorIdentity::colorless(),
            limit: 50,
            offset: 0,
            command: None,
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v,
        None => fail(&format!("{flag} requires a value")),
    }
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> T {
    raw.parse()
        .unwrap_or_else(|_| fail(&format!("invalid value for {flag}: {raw}")))
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                config.db_path = PathBuf::from(value_of(&args, i, "--db"));
                i += 2;
            }
            "--allocation" | "-a" => {
                config.allocation = Some(PathBuf::from(value_of(&args, i, "--allocation")));
                i += 2;
            }
            "--max-price" | "-m" => {
                config.constraints.max_price = number(value_of(&args, i, "--max-price"), "--max-price");
                i += 2;
            }
            "--power-level" => {
                config.constraints.power_level =
                    Some(number(value_of(&args, i, "--power-level"), "--power-level"));
                i += 2;
            }
            "--strategy" => {
                config.constraints.strategy = Some(value_of(&args, i, "--strategy").to_string());
                i += 2;
            }
            "--workers" | "-w" => {
                config.workers = number(value_of(&args, i, "--workers"), "--workers");
                i += 2;
            }
            "--name" | "-n" => {
                config.name = Some(value_of(&args, i, "--name").to_string());
                i += 2;
            }
            "--colors" | "-c" => {
                config.colors = ColorIdentity::from_symbols(value_of(&args, i, "--colors"));
                i += 2;
            }
            "--limit" | "-l" => {
                config.limit = number(value_of(&args, i, "--limit"), "--limit");
                i += 2;
            }
            "--offset" | "-o" => {
                config.offset = number(value_of(&args, i, "--offset"), "--offset");
                i += 2;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => fail(&format!("unknown argument: {arg}")),
            arg => {
                positional.push(arg.to_string());
                i += 1;
            }
        }
    }

    let mut positional = positional.into_iter();
    config.command = match positional.next().as_deref() {
        Some("generate") => {
            let ids: Vec<CardId> = positional.map(CardId::from).collect();
            if ids.is_empty() {
                fail("generate requires at least one commander id");
            }
            Some(Command::Generate(ids))
        }
        Some("card") => match positional.next() {
            Some(id) => Some(Command::Card(CardId::from(id))),
            None => fail("card requires an id"),
        },
        Some("search") => match positional.next() {
            Some(term) => Some(Command::Search(term)),
            None => fail("search requires a term"),
        },
        Some("commanders") => Some(Command::Commanders),
        Some(other) => fail(&format!("unknown command: {other}")),
        None => None,
    };

    config
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn generate(
    service: DeckService,
    ids: Vec<CardId>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = DeckRuntime::new(
        service,
        DeckRuntimeConfig {
            workers: config.workers,
            queue_capacity: ids.len().max(1),
            ..DeckRuntimeConfig::default()
        },
    )?;

    let handles = ids
        .into_iter()
        .map(|id| runtime.submit(id, config.constraints.clone()))
        .collect::<DeckResult<Vec<_>>>()?;
    let decks = handles
        .into_iter()
        .map(deckgen::BuildHandle::join)
        .collect::<DeckResult<Vec<_>>>()?;

    if let [deck] = decks.as_slice() {
        print_json(deck)
    } else {
        print_json(&decks)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut config = parse_args();
    let Some(command) = config.command.take() else {
        println!("{USAGE}");
        return Ok(());
    };

    tracing::info!(path = %config.db_path.display(), "opening card database");
    let repository = Arc::new(open_database(&config.db_path)?);
    let allocation = match &config.allocation {
        Some(path) => AllocationConfig::from_json_file(path)?,
        None => AllocationConfig::default(),
    };
    let service = DeckService::with_config(repository, allocation);

    match command {
        Command::Generate(ids) => generate(service, ids, &config),
        Command::Card(id) => print_json(&service.get_card(&id)?),
        Command::Search(term) => print_json(&service.search_cards(&term, config.limit, config.offset)?),
        Command::Commanders => {
            let filter = CommanderFilter {
                name: config.name.clone(),
                colors: config.colors.clone(),
                limit: config.limit,
                offset: config.offset,
            };
            print_json(&service.list_commanders(&filter)?)
        }
    }
}
