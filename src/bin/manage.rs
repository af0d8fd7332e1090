#![cfg(feature = "cli")]

use std::{
    io::{self, Read as _},
    path::PathBuf,
    process::ExitCode,
};

use camino::Utf8PathBuf;
use clap::{ArgMatches, arg, value_parser};
use dns_master::{
    AddressChoice, Command, Commands, DnsConfig, Error, Modification, SqliteConfiguration,
    SqliteStore, SystemClipboard, TerminalPrompt, clipboard, record::present,
};
use tracing_subscriber::EnvFilter;

/// Hidden subcommand run by the detached process which keeps copied text on
/// the clipboard.
const HOLD_CLIPBOARD: &str = "hold-clipboard";

fn main() -> ExitCode {
    let result = manage();
    if let Err(error) = &result {
        if error.is_store_failure() {
            tracing::debug!("store failure: {error:?}");
        }
        eprintln!("Error: {error}");
    }
    ExitCode::from(exit_status(&result))
}

/// 0 on success (including a declined confirmation), 1 on any error.
/// Usage errors exit with 2 from inside clap.
fn exit_status(result: &Result<(), Error>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn app() -> clap::Command {
    let list_after = || arg!(-l --list "List configurations after the operation");
    let force = || arg!(-f --force "Skip the confirmation prompt");

    clap::Command::new("dns-master")
        .about("Manage named DNS server configurations")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(--db <PATH> "Path to the configuration database")
                .required(false)
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            clap::Command::new("add")
                .about("Add a new DNS configuration")
                .arg(arg!(<IDENTIFIER> "Unique name for the configuration"))
                .arg(arg!(<PRIMARY> "Primary DNS server address"))
                .arg(arg!([SECONDARY] "Secondary DNS server address"))
                .arg(arg!([DESCRIPTION] "What this configuration is for"))
                .arg(list_after()),
        )
        .subcommand(
            clap::Command::new("list")
                .about("List saved DNS configurations")
                .arg(arg!([IDENTIFIERS]... "Only list configurations with these identifiers")),
        )
        .subcommand(
            clap::Command::new("copy")
                .about("Copy the addresses of a configuration to the clipboard")
                .arg(arg!(<IDENTIFIER> "Configuration to copy from"))
                .arg(
                    arg!(-a --address <ADDRESS> "Address to copy, prompts when omitted")
                        .required(false)
                        .value_parser(AddressChoice::ALL.map(|choice| choice.as_str())),
                ),
        )
        .subcommand(
            clap::Command::new("modify")
                .about("Modify an existing DNS configuration")
                .arg(arg!(<IDENTIFIER> "Configuration to modify"))
                .arg(arg!([NEW_IDENTIFIER] "New identifier for the configuration"))
                .arg(arg!([NEW_PRIMARY] "New primary DNS server address"))
                .arg(arg!([NEW_SECONDARY] "New secondary DNS server address"))
                .arg(arg!([NEW_DESCRIPTION] "New description"))
                .arg(list_after()),
        )
        .subcommand(
            clap::Command::new("remove")
                .about("Remove a DNS configuration")
                .arg(arg!(<IDENTIFIER> "Configuration to remove"))
                .arg(force())
                .arg(list_after()),
        )
        .subcommand(
            clap::Command::new("clear")
                .about("Remove all saved DNS configurations")
                .arg(force())
                .arg(list_after()),
        )
        .subcommand(clap::Command::new(HOLD_CLIPBOARD).hide(true))
}

fn parse_command(args: &ArgMatches) -> Result<Command, Error> {
    let command = match args.subcommand() {
        Some(("add", matches)) => {
            let mut record = DnsConfig::new(
                required(matches, "IDENTIFIER"),
                required(matches, "PRIMARY"),
            );
            if let Some(secondary) = optional(matches, "SECONDARY") {
                record = record.with_secondary_address(secondary);
            }
            if let Some(description) = optional(matches, "DESCRIPTION") {
                record = record.with_description(description);
            }
            Command::Add {
                record,
                list_after: matches.get_flag("list"),
            }
        }
        Some(("list", matches)) => Command::List {
            identifiers: matches
                .get_many::<String>("IDENTIFIERS")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        },
        Some(("copy", matches)) => Command::Copy {
            identifier: required(matches, "IDENTIFIER"),
            choice: optional(matches, "address")
                .map(|choice| choice.parse())
                .transpose()?,
        },
        Some(("modify", matches)) => Command::Modify {
            identifier: required(matches, "IDENTIFIER"),
            changes: Modification {
                identifier: optional(matches, "NEW_IDENTIFIER"),
                primary_address: optional(matches, "NEW_PRIMARY"),
                secondary_address: optional(matches, "NEW_SECONDARY"),
                description: optional(matches, "NEW_DESCRIPTION"),
            },
            list_after: matches.get_flag("list"),
        },
        Some(("remove", matches)) => Command::Remove {
            identifier: required(matches, "IDENTIFIER"),
            force: matches.get_flag("force"),
            list_after: matches.get_flag("list"),
        },
        Some(("clear", matches)) => Command::Clear {
            force: matches.get_flag("force"),
            list_after: matches.get_flag("list"),
        },
        _ => unreachable!("clap crimes?"),
    };
    Ok(command)
}

fn required(matches: &ArgMatches, id: &str) -> String {
    optional(matches, id).unwrap_or_else(|| panic!("{id} is required"))
}

/// A blank positional is treated as not supplied, so `""` can skip one.
fn optional(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned().and_then(present)
}

fn database_config(args: &ArgMatches) -> Result<SqliteConfiguration, Error> {
    let config = SqliteConfiguration::default();
    let Some(path) = args.get_one::<PathBuf>("db") else {
        return Ok(config);
    };
    let path = Utf8PathBuf::from_path_buf(path.clone()).map_err(|path| {
        Error::InvalidArgument(format!(
            "database path {} is not valid UTF-8",
            path.display()
        ))
    })?;
    Ok(config.with_path(path))
}

fn hold_clipboard() -> Result<(), Error> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    clipboard::hold(&text)?;
    Ok(())
}

fn manage() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = app().get_matches();
    if args.subcommand_name() == Some(HOLD_CLIPBOARD) {
        return hold_clipboard();
    }
    let command = parse_command(&args)?;
    let config = database_config(&args)?;

    let mut clipboard = SystemClipboard::new();
    match std::env::current_exe() {
        Ok(exe) => clipboard = clipboard.with_holder(exe, [HOLD_CLIPBOARD]),
        Err(error) => tracing::warn!("clipboard holder unavailable: {error}"),
    }

    let mut store = SqliteStore::open(&config)?;
    let result = Commands::new(
        &mut store,
        TerminalPrompt::stdio(),
        clipboard,
        io::stdout().lock(),
    )
    .run(command);

    let closed = store.close();
    result?;
    closed
}
