//! The command layer: runs parsed invocations against an open store.
//!
//! Every command receives the store explicitly through [`Commands`], along
//! with the prompt used for confirmations, the clipboard used by `copy` and
//! the writer that receives user-facing output. Errors are returned to the
//! caller, which is responsible for reporting them and choosing an exit code.

use std::io::Write;

use crate::{
    Error,
    clipboard::{AddressChoice, Clipboard},
    database::SqliteStore,
    prompt::Prompt,
    record::{DnsConfig, Modification},
};

/// A single CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        record: DnsConfig,
        list_after: bool,
    },
    List {
        identifiers: Vec<String>,
    },
    Copy {
        identifier: String,
        choice: Option<AddressChoice>,
    },
    Modify {
        identifier: String,
        changes: Modification,
        list_after: bool,
    },
    Remove {
        identifier: String,
        force: bool,
        list_after: bool,
    },
    Clear {
        force: bool,
        list_after: bool,
    },
}

/// Executes commands against a store.
pub struct Commands<'s, P, C, W> {
    store: &'s mut SqliteStore,
    prompt: P,
    clipboard: C,
    output: W,
}

impl<'s, P, C, W> Commands<'s, P, C, W>
where
    P: Prompt,
    C: Clipboard,
    W: Write,
{
    pub fn new(store: &'s mut SqliteStore, prompt: P, clipboard: C, output: W) -> Self {
        Self {
            store,
            prompt,
            clipboard,
            output,
        }
    }

    /// Consume the runner, returning the output writer.
    pub fn into_output(self) -> W {
        self.output
    }

    #[tracing::instrument(skip_all, level = "debug")]
    pub fn run(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Add { record, list_after } => self.add(record, list_after),
            Command::List { identifiers } => self.list(identifiers.as_slice()),
            Command::Copy { identifier, choice } => self.copy(&identifier, choice).map(|_| ()),
            Command::Modify {
                identifier,
                changes,
                list_after,
            } => self.modify(&identifier, &changes, list_after),
            Command::Remove {
                identifier,
                force,
                list_after,
            } => self.remove(&identifier, force, list_after),
            Command::Clear { force, list_after } => self.clear(force, list_after),
        }
    }

    pub fn add(&mut self, record: DnsConfig, list_after: bool) -> Result<(), Error> {
        let record = self.store.add(record)?;
        self.warn_suspicious(&record)?;
        writeln!(
            self.output,
            "Configuration '{}' has been successfully added.",
            record.identifier()
        )?;
        self.list_if(list_after)
    }

    pub fn list<S: AsRef<str>>(&mut self, identifiers: &[S]) -> Result<(), Error> {
        let records = self.store.list(identifiers)?;
        if records.is_empty() {
            writeln!(self.output, "No DNS configurations found.")?;
            return Ok(());
        }
        write_table(&mut self.output, &records)?;
        Ok(())
    }

    /// Copy one or both addresses of a record, asking which when `choice` is `None`.
    ///
    /// Returns the text placed on the clipboard.
    pub fn copy(&mut self, identifier: &str, choice: Option<AddressChoice>) -> Result<String, Error> {
        let record = self.store.get(identifier)?;

        let choice = match choice {
            Some(choice) => choice,
            None => self.select_address(&record)?,
        };

        let text = choice.resolve(&record)?;
        self.clipboard.copy(&text)?;
        writeln!(
            self.output,
            "Copied {choice} address of '{identifier}' to the clipboard: {text}"
        )?;
        Ok(text)
    }

    pub fn modify(
        &mut self,
        identifier: &str,
        changes: &Modification,
        list_after: bool,
    ) -> Result<(), Error> {
        if changes.is_empty() {
            // Still surfaces NotFound for an unknown identifier.
            self.store.get(identifier)?;
            writeln!(
                self.output,
                "No changes supplied. Configuration '{identifier}' was left as it is."
            )?;
            return Ok(());
        }

        let record = self.store.modify(identifier, changes)?;
        self.warn_suspicious(&record)?;

        if record.identifier() != identifier {
            writeln!(
                self.output,
                "Configuration '{identifier}' has been successfully modified and renamed to '{}'.",
                record.identifier()
            )?;
        } else {
            writeln!(
                self.output,
                "Configuration '{identifier}' has been successfully modified."
            )?;
        }
        self.list_if(list_after)
    }

    pub fn remove(&mut self, identifier: &str, force: bool, list_after: bool) -> Result<(), Error> {
        self.store.get(identifier)?;

        let question = format!("Are you sure you want to delete the configuration '{identifier}'?");
        if !force && !self.prompt.confirm(&question)? {
            tracing::debug!(%identifier, "removal declined");
            writeln!(
                self.output,
                "Operation cancelled. No configurations were deleted."
            )?;
            return Ok(());
        }

        self.store.remove(identifier)?;
        writeln!(
            self.output,
            "Configuration '{identifier}' has been successfully removed."
        )?;
        self.list_if(list_after)
    }

    pub fn clear(&mut self, force: bool, list_after: bool) -> Result<(), Error> {
        if !force && !self.prompt.confirm("Are you sure you want to delete all configurations?")? {
            tracing::debug!("clear declined");
            writeln!(
                self.output,
                "Operation cancelled. No configurations were deleted."
            )?;
            return Ok(());
        }

        let n = self.store.clear()?;
        writeln!(
            self.output,
            "All DNS configurations have been successfully deleted ({n} removed)."
        )?;
        self.list_if(list_after)
    }

    fn select_address(&mut self, record: &DnsConfig) -> Result<AddressChoice, Error> {
        let names = AddressChoice::ALL.map(|choice| choice.as_str());
        let question = format!(
            "Which address of '{}' should be copied?",
            record.identifier()
        );
        self.prompt
            .select(&question, &names)?
            .and_then(|index| AddressChoice::ALL.get(index).copied())
            .ok_or_else(|| Error::InvalidArgument("no address was selected".into()))
    }

    fn warn_suspicious(&mut self, record: &DnsConfig) -> Result<(), Error> {
        for address in record.suspicious_addresses() {
            tracing::warn!(%address, "address is not an IP literal");
            writeln!(
                self.output,
                "Warning: '{address}' is not an IPv4 or IPv6 address."
            )?;
        }
        Ok(())
    }

    fn list_if(&mut self, list_after: bool) -> Result<(), Error> {
        if list_after {
            self.list::<&str>(&[])?;
        }
        Ok(())
    }
}

const HEADERS: [&str; 4] = [
    "Identifier",
    "Primary Address",
    "Secondary Address",
    "Description",
];

/// Render records as an aligned, plain-text table.
fn write_table<W: Write>(output: &mut W, records: &[DnsConfig]) -> std::io::Result<()> {
    let rows: Vec<[&str; 4]> = records
        .iter()
        .map(|record| {
            [
                record.identifier(),
                record.primary_address(),
                record.secondary_address().unwrap_or(""),
                record.description().unwrap_or("No Description"),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separators = widths.map(|width| "-".repeat(width));
    let separators = separators.each_ref().map(String::as_str);

    for row in std::iter::once(&HEADERS)
        .chain(std::iter::once(&separators))
        .chain(&rows)
    {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(output, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let records = vec![
            DnsConfig::new("google", "8.8.8.8")
                .with_secondary_address("8.8.4.4")
                .with_description("Google DNS"),
            DnsConfig::new("quad9", "9.9.9.9"),
        ];

        let mut output = Vec::new();
        write_table(&mut output, &records).unwrap();
        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Identifier  Primary Address  Secondary Address  Description"
        );
        assert_eq!(
            lines[1],
            "----------  ---------------  -----------------  --------------"
        );
        assert_eq!(
            lines[2],
            "google      8.8.8.8          8.8.4.4            Google DNS"
        );
        assert_eq!(
            lines[3],
            "quad9       9.9.9.9                             No Description"
        );
    }
}
