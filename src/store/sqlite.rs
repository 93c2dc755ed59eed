use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ffi, params};
use uuid::Uuid;

use super::Store;
use super::schema::SCHEMA;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::*;

const ANALYSIS_COLUMNS: &str =
    "id, user_id, player_number, team, jersey_color, analysis_text, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    policies: PolicySet,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
            policies: PolicySet::analyses(false),
        })
    }

    /// Opens the database described by `config` with its policy set.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(config.db_path())?.with_policies(config.policies()))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
            policies: PolicySet::analyses(false),
        })
    }

    #[must_use]
    pub fn with_policies(mut self, policies: PolicySet) -> Self {
        self.policies = policies;
        self
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// Statements issued through it are not subject to the policy set.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    /// The owner to pin a read to, or `None` when the identity sees nothing.
    /// `Some(None)` means unrestricted.
    fn read_scope(&self, identity: &Identity) -> Option<Option<String>> {
        match self.policies.row_filter(&identity.normalized(), Command::Select) {
            RowFilter::All => Some(None),
            RowFilter::Owner(uid) => Some(Some(uid)),
            RowFilter::Nothing => {
                tracing::debug!(
                    "No {} policy on {} admits {}; returning no rows",
                    Command::Select,
                    self.policies.table,
                    identity.role()
                );
                None
            }
        }
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's datetime('now') format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

// Same shape as the column default so stored timestamps sort as text.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn row_to_analysis(row: &Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        player_number: row.get(2)?,
        team: row.get(3)?,
        jersey_color: row.get(4)?,
        analysis_text: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

/// Maps engine constraint failures onto the store's error kinds.
fn map_constraint_error(err: rusqlite::Error) -> Error {
    let (code, message) = match &err {
        rusqlite::Error::SqliteFailure(e, msg)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            (e.extended_code, msg.clone())
        }
        _ => return Error::from(err),
    };

    match code {
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Error::ForeignKeyViolation,
        ffi::SQLITE_CONSTRAINT_NOTNULL => Error::NotNullViolation {
            column: not_null_column(message.as_deref()),
        },
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => Error::AlreadyExists,
        _ => Error::from(err),
    }
}

// "NOT NULL constraint failed: analyses.user_id" -> "user_id"
fn not_null_column(message: Option<&str>) -> String {
    message
        .and_then(|m| m.rsplit(['.', ' ']).next())
        .filter(|c| !c.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn policies(&self) -> &PolicySet {
        &self.policies
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
                params![
                    normalize_user_id(&user.id),
                    user.email,
                    format_datetime(&user.created_at)
                ],
            )
            .map_err(map_constraint_error)?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, created_at FROM users WHERE id = ?1",
            params![normalize_user_id(id)],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, email, created_at FROM users WHERE id > ?1 ORDER BY id LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![cursor, limit.max(0)], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "DELETE FROM users WHERE id = ?1",
                params![normalize_user_id(id)],
            )
            .map_err(map_constraint_error)?;
        Ok(rows > 0)
    }

    // Analysis operations

    fn insert_analysis(&self, identity: &Identity, new: &NewAnalysis) -> Result<AnalysisRecord> {
        let identity = identity.normalized();
        let user_id = new.user_id.as_deref().map(normalize_user_id);

        if let Err(e) =
            self.policies
                .check_new_row(&identity, Command::Insert, user_id.as_deref())
        {
            tracing::warn!("Rejected insert into {} as {}: {e}", self.policies.table, identity.role());
            return Err(e);
        }

        let id = Uuid::new_v4().to_string();
        let conn = self.conn();

        let record = match &new.created_at {
            Some(created_at) => conn.query_row(
                &format!(
                    "INSERT INTO analyses ({ANALYSIS_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     RETURNING {ANALYSIS_COLUMNS}"
                ),
                params![
                    id,
                    user_id,
                    new.player_number,
                    new.team,
                    new.jersey_color,
                    new.analysis_text,
                    format_datetime(created_at),
                ],
                row_to_analysis,
            ),
            None => conn.query_row(
                &format!(
                    "INSERT INTO analyses (id, user_id, player_number, team, jersey_color, analysis_text)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {ANALYSIS_COLUMNS}"
                ),
                params![
                    id,
                    user_id,
                    new.player_number,
                    new.team,
                    new.jersey_color,
                    new.analysis_text,
                ],
                row_to_analysis,
            ),
        }
        .map_err(map_constraint_error)?;

        tracing::debug!(
            "Inserted analysis {} for user {} as {}",
            record.id,
            record.user_id,
            identity.role()
        );
        Ok(record)
    }

    fn get_analysis(&self, identity: &Identity, id: &str) -> Result<Option<AnalysisRecord>> {
        let Some(owner) = self.read_scope(identity) else {
            return Ok(None);
        };

        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {ANALYSIS_COLUMNS} FROM analyses
                 WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)"
            ),
            params![id, owner],
            row_to_analysis,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_analyses(
        &self,
        identity: &Identity,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<AnalysisRecord>> {
        let Some(owner) = self.read_scope(identity) else {
            return Ok(Vec::new());
        };

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses
             WHERE (?1 IS NULL OR user_id = ?1) AND id > ?2
             ORDER BY id LIMIT ?3"
        ))?;

        let rows = stmt.query_map(params![owner, cursor, limit.max(0)], row_to_analysis)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_analyses(&self, identity: &Identity) -> Result<i64> {
        let Some(owner) = self.read_scope(identity) else {
            return Ok(0);
        };

        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM analyses WHERE (?1 IS NULL OR user_id = ?1)",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
