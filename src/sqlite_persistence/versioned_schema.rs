use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Only mutated when optional fields are passed (e.g. `non_null = true`)
            #[allow(unused_mut)]
            let mut column = $crate::sqlite_persistence::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_declared(declared: &str) -> Option<&'static SqlType> {
        match declared {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            _ => None,
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a> {
    pub name: &'a str,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub foreign_key: Option<&'a ForeignKey>,
}

impl Column<'_> {
    fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type.as_sql());
        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.non_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(foreign_key) = self.foreign_key {
            sql.push_str(&format!(
                " REFERENCES {}({}) ON DELETE {}",
                foreign_key.foreign_table,
                foreign_key.foreign_column,
                foreign_key.on_delete.as_sql()
            ));
        }
        sql
    }
}

/// A table definition. `indices` are `(index name, column list)` pairs, the
/// column list is used verbatim so composite indices are written as `"a, b"`.
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static>],
    pub indices: &'static [(&'static str, &'static str)],
}

/// Column as reported by `PRAGMA table_info`.
struct LiveColumn {
    name: String,
    sql_type: Option<&'static SqlType>,
    declared_type: String,
    non_null: bool,
    is_primary_key: bool,
}

struct LiveForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
    on_delete: String,
}

impl Table {
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(Column::definition)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.name, columns)
    }

    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute(&self.create_sql(), params![])
            .with_context(|| format!("Failed to create table {}", self.name))?;
        for (index_name, columns) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {}({});",
                    index_name, self.name, columns
                ),
                params![],
            )
            .with_context(|| format!("Failed to create index {}", index_name))?;
        }
        Ok(())
    }

    pub fn drop(&self, conn: &Connection) -> Result<()> {
        conn.execute(&format!("DROP TABLE IF EXISTS {};", self.name), params![])
            .with_context(|| format!("Failed to drop table {}", self.name))?;
        Ok(())
    }

    fn live_columns(&self, conn: &Connection) -> Result<Vec<LiveColumn>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let columns = stmt
            .query_map(params![], |row| {
                let declared_type: String = row.get(2)?;
                Ok(LiveColumn {
                    name: row.get(1)?,
                    sql_type: SqlType::from_declared(&declared_type),
                    declared_type,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn live_foreign_keys(&self, conn: &Connection) -> Result<Vec<LiveForeignKey>> {
        // id, seq, table, from, to, on_update, on_delete, match
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({});", self.name))?;
        let foreign_keys = stmt
            .query_map(params![], |row| {
                Ok(LiveForeignKey {
                    from_column: row.get(3)?,
                    to_table: row.get(2)?,
                    to_column: row.get(4)?,
                    on_delete: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(foreign_keys)
    }

    fn has_index(&self, conn: &Connection, index_name: &str) -> Result<bool> {
        let found = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1 AND tbl_name = ?2",
                params![index_name, self.name],
                |_| Ok(()),
            )
            .optional()
            .with_context(|| format!("Failed to look up index {}", index_name))?;
        Ok(found.is_some())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let live_columns = self.live_columns(conn)?;
        if live_columns.is_empty() {
            bail!("Table {} does not exist", self.name);
        }
        if live_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: {}, expected: {}",
                self.name,
                live_columns.len(),
                self.columns.len(),
                live_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                self.columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (live, expected) in live_columns.iter().zip(self.columns.iter()) {
            if live.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    live.name
                );
            }
            if live.sql_type != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    live.declared_type
                );
            }
            if live.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    live.non_null
                );
            }
            if live.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    live.is_primary_key
                );
            }
        }

        for (index_name, _) in self.indices {
            if !self.has_index(conn, index_name)? {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }

        let live_foreign_keys = self.live_foreign_keys(conn)?;
        for column in self.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let on_delete = expected.on_delete.as_sql();
            match live_foreign_keys
                .iter()
                .find(|fk| fk.from_column == column.name)
            {
                Some(fk)
                    if fk.to_table == expected.foreign_table
                        && fk.to_column == expected.foreign_column
                        && fk.on_delete == on_delete => {}
                Some(fk) => bail!(
                    "Table {} column {} has foreign key mismatch: expected REFERENCES {}({}) ON DELETE {}, got REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    on_delete,
                    fk.to_table,
                    fk.to_column,
                    fk.on_delete
                ),
                None => bail!(
                    "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                    self.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    on_delete
                ),
            }
        }
        Ok(())
    }
}

/// A set of tables stamped with a version in `PRAGMA user_version`.
///
/// Tables are listed in dependency order: referenced tables first. Creation
/// walks the list forwards, dropping walks it backwards.
pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    /// Creates every missing table and index, checks the result against the
    /// definition, then stamps the version.
    ///
    /// Safe to call on a database that already holds this schema. A database
    /// stamped with another version, or holding tables that don't match, is
    /// rejected and its stamp is left as it was.
    pub fn create(&self, conn: &Connection) -> Result<()> {
        self.check_version(conn)?;
        for table in self.tables {
            table.create(conn)?;
        }
        self.validate(conn)?;
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + self.version)?;
        Ok(())
    }

    /// Drops every table that exists and clears the version stamp.
    pub fn drop(&self, conn: &Connection) -> Result<()> {
        for table in self.tables.iter().rev() {
            table.drop(conn)?;
        }
        conn.pragma_update(None, "user_version", 0)?;
        Ok(())
    }

    /// Returns the version stamped in the database, `None` for an unstamped one.
    pub fn stamped_version(conn: &Connection) -> Result<Option<usize>> {
        let user_version: i64 = conn
            .query_row("PRAGMA user_version;", [], |r| r.get(0))
            .context("Failed to read database version")?;
        if user_version < BASE_DB_VERSION as i64 {
            return Ok(None);
        }
        Ok(Some((user_version - BASE_DB_VERSION as i64) as usize))
    }

    /// Fails if the database was stamped by a different schema version.
    pub fn check_version(&self, conn: &Connection) -> Result<()> {
        match Self::stamped_version(conn)? {
            Some(version) if version != self.version => bail!(
                "Database schema version {} does not match expected version {}",
                version,
                self.version
            ),
            _ => Ok(()),
        }
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}
