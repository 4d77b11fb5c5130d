//! Declarative SQLite schema helpers shared by the SQLite-backed stores.
//!
//! Tables are described as consts and created/validated against the
//! `user_version` pragma on open.

use anyhow::{bail, Result};
use rusqlite::Connection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    fn sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<&'static str>,
    /// (foreign table, foreign column); deletes cascade.
    pub references: Option<(&'static str, &'static str)>,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Column {
            name,
            sql_type,
            is_primary_key: false,
            non_null: false,
            default_value: None,
            references: None,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub const fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// (index name, column name) pairs.
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    fn create(&self, conn: &Connection) -> Result<()> {
        let mut sql = format!("CREATE TABLE {} (", self.name);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column.name);
            sql.push(' ');
            sql.push_str(column.sql_type.sql());
            if column.is_primary_key {
                sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                sql.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some((foreign_table, foreign_column)) = column.references {
                sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE CASCADE",
                    foreign_table, foreign_column
                ));
            }
        }
        sql.push_str(");");
        conn.execute(&sql, [])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                [],
            )?;
        }
        Ok(())
    }

    fn exists(&self, conn: &Connection) -> Result<bool> {
        let found: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1",
                [self.name],
                |_| Ok(true),
            )
            .unwrap_or(false);
        Ok(found)
    }
}

pub struct Schema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl Schema {
    /// Create all tables on a fresh database and stamp the version, or
    /// validate an existing database against this schema.
    pub fn ensure(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let user_version: usize =
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if user_version == 0 && !self.tables[0].exists(conn)? {
            for table in self.tables {
                table.create(conn)?;
            }
            conn.execute(&format!("PRAGMA user_version = {}", self.version), [])?;
            return Ok(());
        }

        if user_version != self.version {
            bail!(
                "Database schema version mismatch: found {}, expected {}",
                user_version,
                self.version
            );
        }
        for table in self.tables {
            if !table.exists(conn)? {
                bail!("Database is missing table '{}'", table.name);
            }
        }
        Ok(())
    }
}
