use rusqlite::{OptionalExtension as _, named_params};

use crate::{database::FromRow as _, record::DnsConfig};

use super::QueryBuilder;

#[derive(Debug, Clone)]
pub(crate) struct DnsConfigPersistence<'c> {
    connection: &'c rusqlite::Connection,
}

impl<'c> DnsConfigPersistence<'c> {
    pub(crate) fn new(connection: &'c rusqlite::Connection) -> Self {
        Self { connection }
    }

    // `id` is an implicit autoincrement key, only used to keep insertion order.
    const TABLE: QueryBuilder<4> = QueryBuilder {
        table: "dns_config",
        columns: [
            "identifier",
            "primary_address",
            "secondary_address",
            "description",
        ],
        order: "id",
    };

    /// Get a single record by identifier
    #[tracing::instrument(skip_all, fields(%identifier), level = "trace")]
    pub(crate) fn get(&self, identifier: &str) -> rusqlite::Result<Option<DnsConfig>> {
        let mut stmt = self
            .connection
            .prepare(&Self::TABLE.select("WHERE identifier = :identifier"))?;
        stmt.query_row(
            named_params! { ":identifier": identifier },
            DnsConfig::from_row,
        )
        .optional()
    }

    #[tracing::instrument(skip_all, fields(%identifier), level = "trace")]
    pub(crate) fn exists(&self, identifier: &str) -> rusqlite::Result<bool> {
        let mut stmt = self.connection.prepare(&format!(
            "SELECT 1 FROM {table} WHERE identifier = :identifier",
            table = Self::TABLE.table
        ))?;
        stmt.exists(named_params! { ":identifier": identifier })
    }

    #[tracing::instrument(skip_all, level = "trace")]
    pub(crate) fn list(&self) -> rusqlite::Result<Vec<DnsConfig>> {
        let mut stmt = self.connection.prepare(&Self::TABLE.select(""))?;
        let records = stmt
            .query_map([], DnsConfig::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Find the records named by `identifiers`
    #[tracing::instrument(skip_all, level = "trace")]
    pub(crate) fn find(&self, identifiers: &[&str]) -> rusqlite::Result<Vec<DnsConfig>> {
        let param_template = std::iter::repeat_n("?", identifiers.len())
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.connection.prepare(
            &Self::TABLE.select(&format!("WHERE identifier IN ({param_template})")),
        )?;
        tracing::trace!("filtering on {} identifiers", identifiers.len());
        let records = stmt
            .query_map(
                rusqlite::params_from_iter(identifiers.iter()),
                DnsConfig::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    #[tracing::instrument(skip_all, fields(identifier=%record.identifier()), level = "trace")]
    pub(crate) fn insert(&self, record: &DnsConfig) -> rusqlite::Result<usize> {
        let mut stmt = self.connection.prepare(&Self::TABLE.insert())?;
        stmt.execute(named_params! {
            ":identifier": record.identifier(),
            ":primary_address": record.primary_address(),
            ":secondary_address": record.secondary_address(),
            ":description": record.description(),
        })
    }

    /// Overwrite the row currently stored under `identifier` with `record`.
    #[tracing::instrument(skip_all, fields(%identifier), level = "trace")]
    pub(crate) fn update(&self, identifier: &str, record: &DnsConfig) -> rusqlite::Result<usize> {
        let mut stmt = self.connection.prepare(&Self::TABLE.update("identifier"))?;
        let n = stmt.execute(named_params! {
            ":identifier": record.identifier(),
            ":primary_address": record.primary_address(),
            ":secondary_address": record.secondary_address(),
            ":description": record.description(),
            ":current_identifier": identifier,
        })?;
        if n > 0 {
            tracing::trace!("affected {} rows", n);
        } else {
            tracing::trace!("no rows affected")
        }
        Ok(n)
    }

    #[tracing::instrument(skip_all, fields(%identifier), level = "trace")]
    pub(crate) fn delete(&self, identifier: &str) -> rusqlite::Result<usize> {
        let mut stmt = self.connection.prepare(&Self::TABLE.delete("identifier"))?;
        stmt.execute(named_params! { ":identifier": identifier })
    }

    #[tracing::instrument(skip_all, level = "trace")]
    pub(crate) fn clear(&self) -> rusqlite::Result<usize> {
        let mut stmt = self
            .connection
            .prepare(&format!("DELETE FROM {table}", table = Self::TABLE.table))?;
        let nrows = stmt.execute([])?;
        tracing::trace!("dropped {} records", nrows);
        Ok(nrows)
    }
}
