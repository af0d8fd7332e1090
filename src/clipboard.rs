//! Copying addresses to the system clipboard.

use std::{
    ffi::OsString,
    fmt,
    io::{self, Write as _},
    path::PathBuf,
    process::{self, Stdio},
};

use crate::{Error, record::DnsConfig};

/// A destination for copied text.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    fn copy(&mut self, text: &str) -> Result<(), arboard::Error>;
}

impl<C: Clipboard + ?Sized> Clipboard for &mut C {
    fn copy(&mut self, text: &str) -> Result<(), arboard::Error> {
        (**self).copy(text)
    }
}

/// The host clipboard, opened lazily on first use so that commands which
/// never copy anything work in headless environments.
///
/// X11 and Wayland only serve the selection while its owner is alive. On Linux
/// a [holder](SystemClipboard::with_holder) process receives the text on stdin
/// and keeps serving it (see [`hold`]) after this process exits.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    holder: Option<Holder>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand copied text to `program args..` on stdin after every copy.
    pub fn with_holder<I, S>(mut self, program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.holder = Some(Holder {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.inner.is_some())
            .field("holder", &self.holder)
            .finish()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), arboard::Error> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard.set_text(text)?;
        tracing::debug!("copied {} bytes to the clipboard", text.len());

        #[cfg(target_os = "linux")]
        {
            if let Some(holder) = &self.holder {
                let child = holder.spawn(text).map_err(|error| arboard::Error::Unknown {
                    description: format!("unable to start clipboard holder: {error}"),
                })?;
                tracing::debug!(pid = child.id(), "handed the selection to a holder process");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Holder {
    program: PathBuf,
    args: Vec<OsString>,
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
impl Holder {
    /// Start the holder and write `text` to its stdin. The child is not waited on.
    fn spawn(&self, text: &str) -> io::Result<process::Child> {
        let mut child = process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Dropping stdin closes the pipe so the holder sees end of input.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        Ok(child)
    }
}

/// Take ownership of the clipboard with `text` and serve it until another
/// program replaces the contents.
///
/// This blocks on Linux and is meant to run in a detached holder process.
pub fn hold(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;

    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;
        clipboard.set().wait().text(text)?;
    }

    #[cfg(not(target_os = "linux"))]
    clipboard.set_text(text)?;

    Ok(())
}

/// Which address(es) of a record to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressChoice {
    Primary,
    Secondary,
    Both,
}

impl AddressChoice {
    pub const ALL: [AddressChoice; 3] = [
        AddressChoice::Primary,
        AddressChoice::Secondary,
        AddressChoice::Both,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressChoice::Primary => "primary",
            AddressChoice::Secondary => "secondary",
            AddressChoice::Both => "both",
        }
    }

    /// The text to place on the clipboard for `record`.
    ///
    /// Both addresses are joined with `", "`. Choosing the secondary address
    /// (alone or with the primary) fails when the record has none.
    pub fn resolve(&self, record: &DnsConfig) -> Result<String, Error> {
        let secondary = || {
            record.secondary_address().ok_or_else(|| Error::MissingAddress {
                identifier: record.identifier().to_owned(),
                address: "secondary",
            })
        };

        match self {
            AddressChoice::Primary => Ok(record.primary_address().to_owned()),
            AddressChoice::Secondary => Ok(secondary()?.to_owned()),
            AddressChoice::Both => Ok(format!(
                "{}, {}",
                record.primary_address(),
                secondary()?
            )),
        }
    }
}

impl fmt::Display for AddressChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AddressChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(AddressChoice::Primary),
            "secondary" => Ok(AddressChoice::Secondary),
            "both" => Ok(AddressChoice::Both),
            other => Err(Error::InvalidArgument(format!(
                "'{other}' is not one of primary, secondary or both"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> DnsConfig {
        DnsConfig::new("google", "8.8.8.8").with_secondary_address("8.8.4.4")
    }

    #[test]
    fn test_resolve_primary() {
        assert_eq!(AddressChoice::Primary.resolve(&google()).unwrap(), "8.8.8.8");
    }

    #[test]
    fn test_resolve_both() {
        assert_eq!(
            AddressChoice::Both.resolve(&google()).unwrap(),
            "8.8.8.8, 8.8.4.4"
        );
    }

    #[test]
    fn test_resolve_missing_secondary() {
        let record = DnsConfig::new("quad9", "9.9.9.9");
        assert!(matches!(
            AddressChoice::Secondary.resolve(&record),
            Err(Error::MissingAddress { address: "secondary", .. })
        ));
        assert!(matches!(
            AddressChoice::Both.resolve(&record),
            Err(Error::MissingAddress { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_holder_receives_text() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("held");
        let holder = Holder {
            program: "sh".into(),
            args: vec!["-c".into(), "cat > \"$0\"".into(), target.clone().into()],
        };

        let mut child = holder.spawn("8.8.8.8, 8.8.4.4").unwrap();
        assert!(child.wait().unwrap().success());

        assert_eq!(std::fs::read_to_string(target).unwrap(), "8.8.8.8, 8.8.4.4");
    }

    #[test]
    fn test_holder_missing_program() {
        let holder = Holder {
            program: "/nonexistent/dns-master-holder".into(),
            args: Vec::new(),
        };
        assert!(holder.spawn("8.8.8.8").is_err());
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(
            "Secondary".parse::<AddressChoice>().unwrap(),
            AddressChoice::Secondary
        );
        assert!("tertiary".parse::<AddressChoice>().is_err());
    }
}
