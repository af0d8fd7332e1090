//! SQLite persistence for DNS configurations.

use camino::{Utf8Path, Utf8PathBuf};
use monarch_db::{MonarchDB, StaticMonarchConfiguration};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    record::{DnsConfig, Modification},
};

mod dns_config;

use self::dns_config::DnsConfigPersistence;

/// Application name used to locate the per-user data directory.
pub const APP_NAME: &str = "dns-master";

/// File name of the database inside the data directory.
pub const DATABASE_NAME: &str = "dns_configs.db";

pub(crate) trait FromRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>
    where
        Self: Sized;
}

const MONARCH: StaticMonarchConfiguration<1> = StaticMonarchConfiguration {
    name: "dns-master",
    enable_foreign_keys: false,
    migrations: [include_str!("migrations/01.dns_config.sql")],
};

fn default_busy_timeout() -> u64 {
    500
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfiguration {
    #[serde(default)]
    path: Option<Utf8PathBuf>,

    #[serde(default = "default_busy_timeout")]
    busy_timeout_ms: u64,
}

impl Default for SqliteConfiguration {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

impl SqliteConfiguration {
    /// Use an explicit database file instead of the per-user default.
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The database file this configuration points at.
    ///
    /// Falls back to `<data dir>/dns-master/dns_configs.db` when no path was set.
    pub fn database_path(&self) -> Result<Utf8PathBuf, Error> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }
}

/// The per-user default location of the database.
pub fn default_database_path() -> Result<Utf8PathBuf, Error> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME).ok_or(Error::NoDataDirectory)?;
    let data_dir = Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf())
        .map_err(|_| Error::NoDataDirectory)?;
    Ok(data_dir.join(DATABASE_NAME))
}

/// A store of DNS configurations backed by a single SQLite connection.
///
/// The connection is owned by the store and closed when it is dropped. Each
/// mutating operation runs in its own transaction and is committed before
/// the call returns.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    fn prepare(connection: Connection) -> rusqlite::Result<Self> {
        let db = MonarchDB::from(MONARCH);
        let connection = db.migrate(connection)?;
        Ok(Self { connection })
    }

    /// Open the store described by `config`, creating the database file and
    /// its parent directories if needed.
    pub fn open(config: &SqliteConfiguration) -> Result<Self, Error> {
        let path = config.database_path()?;
        create_parent_directory(&path)?;

        tracing::debug!(%path, "opening configuration database");
        let connection = Connection::open(&path)?;
        connection.pragma_update(None, "busy_timeout", config.busy_timeout_ms)?;
        Ok(Self::prepare(connection)?)
    }

    /// Open a store at `path`.
    pub fn open_path(path: impl Into<Utf8PathBuf>) -> Result<Self, Error> {
        Self::open(&SqliteConfiguration::default().with_path(path))
    }

    /// Creates a new store backed by an in-memory database.
    pub fn new_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        Ok(Self::prepare(connection)?)
    }

    /// Close the underlying connection, reporting any error from SQLite.
    pub fn close(self) -> Result<(), Error> {
        self.connection
            .close()
            .map_err(|(_, error)| Error::StoreFailure(error))
    }

    /// Insert a new record.
    #[tracing::instrument(skip_all, fields(identifier=%record.identifier()), level = "debug")]
    pub fn add(&mut self, record: DnsConfig) -> Result<DnsConfig, Error> {
        record.validate()?;

        let tx = self.connection.transaction()?;
        let px = DnsConfigPersistence::new(&tx);
        if px.exists(record.identifier())? {
            return Err(Error::DuplicateIdentifier(record.identifier().to_owned()));
        }
        let n = px.insert(&record)?;
        tx.commit()?;
        tracing::debug!("inserted {n} records");
        Ok(record)
    }

    /// Fetch a single record by identifier.
    #[tracing::instrument(skip_all, fields(%identifier), level = "debug")]
    pub fn get(&self, identifier: &str) -> Result<DnsConfig, Error> {
        let px = DnsConfigPersistence::new(&self.connection);
        px.get(identifier)?
            .ok_or_else(|| Error::NotFound(identifier.to_owned()))
    }

    /// List records in insertion order.
    ///
    /// An empty `filter` lists every record. Otherwise only records whose
    /// identifier appears in `filter` are returned; identifiers that match
    /// nothing are ignored.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn list<S: AsRef<str>>(&self, filter: &[S]) -> Result<Vec<DnsConfig>, Error> {
        let px = DnsConfigPersistence::new(&self.connection);
        let records = if filter.is_empty() {
            px.list()?
        } else {
            let identifiers: Vec<&str> = filter.iter().map(AsRef::as_ref).collect();
            px.find(&identifiers)?
        };
        tracing::debug!("list {n} records", n = records.len());
        Ok(records)
    }

    /// Update the supplied fields of an existing record, possibly renaming it.
    #[tracing::instrument(skip_all, fields(%identifier), level = "debug")]
    pub fn modify(
        &mut self,
        identifier: &str,
        changes: &Modification,
    ) -> Result<DnsConfig, Error> {
        changes.validate()?;

        let tx = self.connection.transaction()?;
        let px = DnsConfigPersistence::new(&tx);
        let mut record = px
            .get(identifier)?
            .ok_or_else(|| Error::NotFound(identifier.to_owned()))?;

        if let Some(renamed) = changes.identifier.as_deref() {
            if renamed != identifier && px.exists(renamed)? {
                return Err(Error::DuplicateIdentifier(renamed.to_owned()));
            }
        }

        record.apply(changes);
        let n = px.update(identifier, &record)?;
        tx.commit()?;
        tracing::debug!("modified {n} records");
        Ok(record)
    }

    /// Delete a single record.
    #[tracing::instrument(skip_all, fields(%identifier), level = "debug")]
    pub fn remove(&mut self, identifier: &str) -> Result<(), Error> {
        let tx = self.connection.transaction()?;
        let px = DnsConfigPersistence::new(&tx);
        let n = px.delete(identifier)?;
        if n == 0 {
            return Err(Error::NotFound(identifier.to_owned()));
        }
        tx.commit()?;
        tracing::debug!("removed {n} records");
        Ok(())
    }

    /// Delete every record, returning how many were removed.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn clear(&mut self) -> Result<usize, Error> {
        let tx = self.connection.transaction()?;
        let px = DnsConfigPersistence::new(&tx);
        let n = px.clear()?;
        tx.commit()?;
        tracing::debug!("cleared {n} records");
        Ok(n)
    }
}

fn create_parent_directory(path: &Utf8Path) -> Result<(), Error> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };

    std::fs::create_dir_all(parent).map_err(|source| Error::DataDirectory {
        path: parent.to_owned(),
        source,
    })
}

struct QueryBuilder<const N: usize> {
    table: &'static str,
    columns: [&'static str; N],
    order: &'static str,
}

impl<const N: usize> QueryBuilder<N> {
    fn select(&self, filters: &str) -> String {
        let columns = self.columns.join(", ");
        format!(
            "SELECT {columns} FROM {table} {filters} ORDER BY {order}",
            table = self.table,
            order = self.order
        )
    }

    fn insert(&self) -> String {
        let columns = self.columns.join(", ");
        let params = self
            .columns
            .iter()
            .map(|c| format!(":{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {table} ({columns}) VALUES ({params})",
            table = self.table
        )
    }

    /// Update every column of the row matching `key`, bound as `:current_{key}`.
    fn update(&self, key: &str) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|c| format!("{c} = :{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {table} SET {assignments} WHERE {key} = :current_{key}",
            table = self.table
        )
    }

    fn delete(&self, key: &str) -> String {
        format!("DELETE FROM {table} WHERE {key} = :{key}", table = self.table)
    }
}
