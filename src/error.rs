use std::io;

use camino::Utf8PathBuf;

/// Errors reported by the record store and the command layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("A configuration with the name '{0}' already exists")]
    DuplicateIdentifier(String),

    #[error("No configuration found with the identifier '{0}'")]
    NotFound(String),

    #[error("Configuration '{identifier}' has no {address} address")]
    MissingAddress {
        identifier: String,
        address: &'static str,
    },

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(#[from] arboard::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    StoreFailure(#[from] rusqlite::Error),

    #[error("Preparing data directory {path}: {source}")]
    DataDirectory {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to determine a data directory for the configuration database")]
    NoDataDirectory,

    #[error("Terminal IO error: {0}")]
    Terminal(#[from] io::Error),
}

impl Error {
    /// Whether this error comes from the persistence layer rather than from user input.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::StoreFailure(_) | Error::DataDirectory { .. } | Error::NoDataDirectory
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_not_store_failures() {
        assert!(!Error::NotFound("google".into()).is_store_failure());
        assert!(!Error::DuplicateIdentifier("google".into()).is_store_failure());
        assert!(Error::NoDataDirectory.is_store_failure());
        assert!(Error::StoreFailure(rusqlite::Error::InvalidQuery).is_store_failure());
    }

    #[test]
    fn test_missing_address_message() {
        let error = Error::MissingAddress {
            identifier: "google".into(),
            address: "secondary",
        };
        assert_eq!(
            error.to_string(),
            "Configuration 'google' has no secondary address"
        );
    }
}
