//! `SQLite` FTS5 index of labeled reference emails, ranked with BM25.
//!
//! # Schema
//!
//! ```sql
//! CREATE VIRTUAL TABLE emails USING fts5(text, label UNINDEXED, metadata UNINDEXED);
//! ```
//!
//! `label` holds the dataset code (`0` safe, non-zero phishing) or a label
//! name; `metadata` holds a JSON object. Rows are validated through the
//! [`RetrievedEmail`] schema on the way out, so label coercion happens there.

use super::EmailRetriever;
use crate::models::RetrievedEmail;
use crate::structured::Schema;
use crate::{Error, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, params};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

/// Acquires a mutex lock, recovering from poison if necessary.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Email index mutex was poisoned, recovering");
            metrics::counter!("email_index_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// BM25-ranked email index backed by `SQLite` FTS5.
pub struct SqliteEmailIndex {
    conn: Mutex<Connection>,
    top_k: usize,
}

impl SqliteEmailIndex {
    /// Default number of similar emails returned.
    pub const DEFAULT_TOP_K: usize = 5;

    /// Opens an existing index read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or has no `emails` table.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| Error::OperationFailed {
                operation: "open_email_index".to_string(),
                cause: format!("{}: {e}", path.display()),
            },
        )?;

        let has_table: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'emails')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::OperationFailed {
                operation: "check_email_index".to_string(),
                cause: e.to_string(),
            })?;
        if !has_table {
            return Err(Error::InvalidInput(format!(
                "{} has no 'emails' table",
                path.display()
            )));
        }

        Ok(Self::from_connection(conn))
    }

    /// Creates (or opens) a writable index at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
            operation: "create_email_index".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let index = Self::from_connection(conn);
        index.initialize()?;
        Ok(index)
    }

    /// Creates an empty in-memory index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_email_index_memory".to_string(),
            cause: e.to_string(),
        })?;
        let index = Self::from_connection(conn);
        index.initialize()?;
        Ok(index)
    }

    /// Sets how many similar emails are returned.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            top_k: Self::DEFAULT_TOP_K,
        }
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute_batch(
            "CREATE VIRTUAL TABLE IF NOT EXISTS emails
             USING fts5(text, label UNINDEXED, metadata UNINDEXED);",
        )
        .map_err(|e| Error::OperationFailed {
            operation: "initialize_email_index".to_string(),
            cause: e.to_string(),
        })
    }

    /// Adds a labeled reference email.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (for example on a read-only index).
    pub fn add_email(&self, text: &str, label: i64, metadata: &Map<String, Value>) -> Result<()> {
        let metadata = Value::Object(metadata.clone()).to_string();
        let conn = acquire_lock(&self.conn);
        conn.execute(
            "INSERT INTO emails (text, label, metadata) VALUES (?1, ?2, ?3)",
            params![text, label, metadata],
        )
        .map(|_| ())
        .map_err(|e| Error::OperationFailed {
            operation: "insert_email".to_string(),
            cause: e.to_string(),
        })
    }

    /// Number of indexed emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn len(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM emails", [], |row| row.get(0))
            .map_err(|e| Error::OperationFailed {
                operation: "count_emails".to_string(),
                cause: e.to_string(),
            })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether the index holds no emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl EmailRetriever for SqliteEmailIndex {
    #[instrument(
        skip(self, query),
        fields(operation = "retrieve", backend = "sqlite", query_length = query.len(), top_k = self.top_k)
    )]
    fn retrieve(&self, query: &str) -> Result<Vec<RetrievedEmail>> {
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };

        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT text, label, metadata, bm25(emails) AS score
                 FROM emails
                 WHERE emails MATCH ?1
                 ORDER BY score
                 LIMIT ?2",
            )
            .map_err(|e| Error::OperationFailed {
                operation: "prepare_retrieve".to_string(),
                cause: e.to_string(),
            })?;

        let limit = i64::try_from(self.top_k).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![fts_query, limit], |row| {
                Ok((
                    row.get::<_, SqlValue>(0)?,
                    row.get::<_, SqlValue>(1)?,
                    row.get::<_, SqlValue>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(|e| Error::OperationFailed {
                operation: "execute_retrieve".to_string(),
                cause: e.to_string(),
            })?;

        let mut emails = Vec::new();
        for row in rows {
            let (text, label, metadata, bm25) = row.map_err(|e| Error::OperationFailed {
                operation: "read_retrieve_row".to_string(),
                cause: e.to_string(),
            })?;

            let candidate = row_to_json(text, label, metadata, bm25);
            match RetrievedEmail::from_value(&candidate) {
                Ok(email) => emails.push(email),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping invalid email index row");
                    metrics::counter!("email_index_invalid_rows_total").increment(1);
                },
            }
        }

        tracing::debug!(results = emails.len(), "Retrieved similar emails");
        Ok(emails)
    }
}

/// Quotes each whitespace-separated term and joins them with `OR`.
///
/// FTS5 treats `-`, `*`, `"`, `:` and bare keywords specially; quoting every
/// term makes arbitrary email text a valid query.
fn build_fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| term.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Maps a raw BM25 score (more negative = better) into `(0, 1)`.
fn normalize_bm25(score: f64) -> f64 {
    let positive_score = -score;
    (1.0 / (1.0 + (-0.5 * positive_score).exp())).clamp(0.0, 1.0)
}

/// Builds the JSON document a row is validated from.
fn row_to_json(text: SqlValue, label: SqlValue, metadata: SqlValue, bm25: f64) -> Value {
    let label = match label {
        // Rows without a label are treated as the dataset's default code.
        SqlValue::Null => Value::from(0),
        other => sql_to_json(other),
    };
    let metadata = match metadata {
        SqlValue::Null => Value::Object(Map::new()),
        SqlValue::Text(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => sql_to_json(other),
    };

    let mut doc = Map::new();
    doc.insert("score".to_string(), Value::from(normalize_bm25(bm25)));
    doc.insert("text".to_string(), sql_to_json(text));
    doc.insert("label".to_string(), label);
    doc.insert("metadata".to_string(), metadata);
    Value::Object(doc)
}

fn sql_to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null | SqlValue::Blob(_) => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Value::from(f),
        SqlValue::Text(s) => Value::String(s),
    }
}
