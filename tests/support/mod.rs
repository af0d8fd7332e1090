#![allow(unused)]

use std::collections::VecDeque;
use std::io;
use std::sync::Once;

use dns_master::{Clipboard, DnsConfig, Prompt, SqliteStore};

/// Registers a global default tracing subscriber when called for the first time. This is intended
/// for use in tests.
pub fn subscribe() {
    static INSTALL_TRACING_SUBSCRIBER: Once = Once::new();
    INSTALL_TRACING_SUBSCRIBER.call_once(|| {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).unwrap();
    });
}

pub fn google() -> DnsConfig {
    DnsConfig::new("google", "8.8.8.8")
        .with_secondary_address("8.8.4.4")
        .with_description("Google DNS")
}

pub fn cloudflare() -> DnsConfig {
    DnsConfig::new("cloudflare", "1.1.1.1").with_secondary_address("1.0.0.1")
}

pub fn quad9() -> DnsConfig {
    DnsConfig::new("quad9", "9.9.9.9")
}

/// An in-memory store pre-populated with `records`.
pub fn store_with(records: impl IntoIterator<Item = DnsConfig>) -> SqliteStore {
    let mut store = SqliteStore::new_in_memory().unwrap();
    for record in records {
        store.add(record).unwrap();
    }
    store
}

/// A prompt which replays canned answers and remembers the questions asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirmations: VecDeque<bool>,
    selections: VecDeque<Option<usize>>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn selecting(mut self, answer: Option<usize>) -> Self {
        self.selections.push_back(answer);
        self
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        self.asked.push(message.to_owned());
        Ok(self
            .confirmations
            .pop_front()
            .expect("unexpected confirmation prompt"))
    }

    fn select(&mut self, message: &str, _choices: &[&str]) -> io::Result<Option<usize>> {
        self.asked.push(message.to_owned());
        Ok(self
            .selections
            .pop_front()
            .expect("unexpected selection prompt"))
    }
}

/// A clipboard which records everything copied to it.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub contents: Option<String>,
    pub copies: usize,
}

impl Clipboard for RecordingClipboard {
    fn copy(&mut self, text: &str) -> Result<(), arboard::Error> {
        self.contents = Some(text.to_owned());
        self.copies += 1;
        Ok(())
    }
}

/// A clipboard standing in for a headless host.
#[derive(Debug, Default)]
pub struct HeadlessClipboard;

impl Clipboard for HeadlessClipboard {
    fn copy(&mut self, _text: &str) -> Result<(), arboard::Error> {
        Err(arboard::Error::ClipboardNotSupported)
    }
}
