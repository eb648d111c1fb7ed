//! SQLite-backed history of saved calculations
//!
//! Each record keeps the full input and result so a saved calculation can be
//! shown again exactly as it was computed. Scalar inputs and totals also get
//! their own columns for listing without decoding JSON.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::core::access::{AccessError, Capability};
use crate::core::identity::{CalculationId, CalculationRef};
use crate::sampling::{CalculationInput, CalculationResult, PurchaseOrderInput};

/// Current schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Default number of records returned by [`HistoryStore::list`]
pub const DEFAULT_LIST_LIMIT: usize = 10;

const SELECT_COLUMNS: &str = "seq, id, created_at, custom_name, factory_name, \
    inspection_level, aql_major, aql_minor, \
    preparation_time_minutes, sampling_time_minutes, inspection_time_per_unit_minutes, \
    packing_check_time_minutes, report_time_minutes, travel_time_minutes, \
    include_travel_time, travel_route, pos, results, total_samples, total_man_days";

/// Errors from the history store
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("history database error: {0}")]
    #[diagnostic(
        code(inspcalc::store::sqlite),
        help("check the database path (--db) is writable, then retry")
    )]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot encode calculation: {0}")]
    #[diagnostic(code(inspcalc::store::encode))]
    Encode(#[from] serde_json::Error),

    #[error("cannot create history directory {path}")]
    #[diagnostic(code(inspcalc::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no saved calculation matches '{0}'")]
    #[diagnostic(
        code(inspcalc::store::not_found),
        help("run `inspcalc history list` to see saved calculations")
    )]
    NotFound(String),

    #[error("history database has schema version {found}, this build supports up to {supported}")]
    #[diagnostic(code(inspcalc::store::schema))]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Access(#[from] AccessError),
}

/// A calculation read back from history
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCalculation {
    /// Stable sequence number, used for `CALC@N`
    pub seq: i64,
    pub id: CalculationId,
    pub created_at: DateTime<Utc>,
    pub custom_name: Option<String>,
    pub input: CalculationInput,
    pub result: CalculationResult,
}

impl SavedCalculation {
    pub fn short_id(&self) -> String {
        CalculationRef::short(self.seq)
    }

    pub fn factory_name(&self) -> Option<&str> {
        self.input.factory_name.as_deref()
    }

    /// Label for listings: custom name, then factory, then the PO list
    pub fn display_name(&self) -> String {
        if let Some(name) = self.custom_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        if let Some(factory) = self.factory_name().filter(|f| !f.trim().is_empty()) {
            return factory.to_string();
        }
        self.input
            .pos
            .iter()
            .map(|po| po.po_number.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The history store backed by SQLite
pub struct HistoryStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Open or create the history database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "opened history database");
        Ok(store)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file, if not in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version for migrations
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per saved calculation; seq is never reused
            CREATE TABLE IF NOT EXISTS calculations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                custom_name TEXT,
                factory_name TEXT,
                inspection_level TEXT NOT NULL,
                aql_major TEXT NOT NULL,
                aql_minor TEXT NOT NULL,
                preparation_time_minutes REAL NOT NULL,
                sampling_time_minutes REAL NOT NULL,
                inspection_time_per_unit_minutes REAL NOT NULL,
                packing_check_time_minutes REAL NOT NULL,
                report_time_minutes REAL NOT NULL,
                travel_time_minutes REAL NOT NULL,
                include_travel_time INTEGER NOT NULL,
                travel_route TEXT,
                pos TEXT NOT NULL,            -- JSON order list
                results TEXT NOT NULL,        -- JSON CalculationResult
                total_samples INTEGER NOT NULL,
                total_man_days REAL NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_calculations_created ON calculations(created_at);
            "#,
        )?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

        match version {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(found) if found > SCHEMA_VERSION => {
                return Err(StoreError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Save a calculation, returning its new id
    pub fn save(
        &self,
        input: &CalculationInput,
        result: &CalculationResult,
        custom_name: Option<&str>,
    ) -> Result<CalculationId, StoreError> {
        let id = CalculationId::new();
        let created_at = Utc::now().to_rfc3339();
        let pos = serde_json::to_string(&input.pos)?;
        let results = serde_json::to_string(result)?;
        let custom_name = custom_name.map(str::trim).filter(|n| !n.is_empty());

        self.conn.execute(
            "INSERT INTO calculations (
                id, created_at, custom_name, factory_name,
                inspection_level, aql_major, aql_minor,
                preparation_time_minutes, sampling_time_minutes, inspection_time_per_unit_minutes,
                packing_check_time_minutes, report_time_minutes, travel_time_minutes,
                include_travel_time, travel_route, pos, results, total_samples, total_man_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                id.to_string(),
                created_at,
                custom_name,
                input.factory_name,
                input.inspection_level.as_str(),
                input.aql_major.as_str(),
                input.aql_minor.as_str(),
                input.preparation_time_minutes,
                input.sampling_time_minutes,
                input.inspection_time_per_unit_minutes,
                input.packing_check_time_minutes,
                input.report_time_minutes,
                input.travel_time_minutes,
                input.include_travel_time,
                input.travel_route,
                pos,
                results,
                result.total_samples,
                result.total_man_days,
            ],
        )?;

        tracing::info!(id = %id, seq = self.conn.last_insert_rowid(), "saved calculation");
        Ok(id)
    }

    /// Most recent calculations, newest first
    pub fn list(&self, limit: usize) -> Result<Vec<SavedCalculation>, StoreError> {
        let sql = format!(
            "SELECT {} FROM calculations ORDER BY seq DESC LIMIT ?1",
            SELECT_COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], map_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = records.len(), "listed saved calculations");
        Ok(records)
    }

    /// Number of saved calculations
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM calculations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Look up one saved calculation by full or short id
    pub fn get(&self, reference: &CalculationRef) -> Result<SavedCalculation, StoreError> {
        let found = match reference {
            CalculationRef::Id(id) => self
                .conn
                .query_row(
                    &format!("SELECT {} FROM calculations WHERE id = ?1", SELECT_COLUMNS),
                    params![id.to_string()],
                    map_row,
                )
                .optional()?,
            CalculationRef::Seq(seq) => self
                .conn
                .query_row(
                    &format!("SELECT {} FROM calculations WHERE seq = ?1", SELECT_COLUMNS),
                    params![seq],
                    map_row,
                )
                .optional()?,
        };

        found.ok_or_else(|| StoreError::NotFound(reference.to_string()))
    }

    /// Delete one saved calculation; needs elevated access
    pub fn delete(
        &self,
        reference: &CalculationRef,
        capability: Capability,
    ) -> Result<(), StoreError> {
        capability.require(Capability::Elevated)?;

        let deleted = match reference {
            CalculationRef::Id(id) => self.conn.execute(
                "DELETE FROM calculations WHERE id = ?1",
                params![id.to_string()],
            )?,
            CalculationRef::Seq(seq) => self
                .conn
                .execute("DELETE FROM calculations WHERE seq = ?1", params![seq])?,
        };

        if deleted == 0 {
            return Err(StoreError::NotFound(reference.to_string()));
        }

        tracing::info!(reference = %reference, "deleted saved calculation");
        Ok(())
    }

    /// Delete every saved calculation; needs elevated access
    pub fn delete_all(&self, capability: Capability) -> Result<usize, StoreError> {
        capability.require(Capability::Elevated)?;

        let deleted = self.conn.execute("DELETE FROM calculations", [])?;
        tracing::info!(count = deleted, "cleared calculation history");
        Ok(deleted)
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SavedCalculation> {
    let created_at: String = row.get(2)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(2, e))?;

    let pos: Vec<PurchaseOrderInput> = json_column(row, 16)?;

    let input = CalculationInput {
        inspection_level: parse_column(row, 5)?,
        aql_major: parse_column(row, 6)?,
        aql_minor: parse_column(row, 7)?,
        pos,
        preparation_time_minutes: row.get(8)?,
        sampling_time_minutes: row.get(9)?,
        inspection_time_per_unit_minutes: row.get(10)?,
        packing_check_time_minutes: row.get(11)?,
        report_time_minutes: row.get(12)?,
        travel_time_minutes: row.get(13)?,
        include_travel_time: row.get(14)?,
        travel_route: row.get(15)?,
        factory_name: row.get(4)?,
    };

    Ok(SavedCalculation {
        seq: row.get(0)?,
        id: parse_column(row, 1)?,
        created_at,
        custom_name: row.get(3)?,
        input,
        result: json_column(row, 17)?,
    })
}
