//! Manage named DNS server configurations stored in a local SQLite database.

pub mod clipboard;
pub mod commands;
pub mod database;
pub mod prompt;
pub mod record;

mod error;

pub use self::clipboard::{AddressChoice, Clipboard, SystemClipboard};
pub use self::commands::{Command, Commands};
pub use self::database::{SqliteConfiguration, SqliteStore};
pub use self::error::Error;
pub use self::prompt::{Prompt, TerminalPrompt};
pub use self::record::{DnsConfig, Modification};
