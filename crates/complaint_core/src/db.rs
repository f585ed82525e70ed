use crate::error::{ComplaintError, Result};
use crate::schema::{Complaint, Snapshot, StaffUpdate};
use crate::store::ComplaintStore;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

/// SQLite-backed document store: one JSON document per opaque key.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        if db_path != ":memory:" {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }
        init(&conn)?;
        info!(db_path, "Opened complaint store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Stores a document verbatim, bypassing `Complaint` encoding.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, key: &str, doc_json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO complaints (key, doc_json) VALUES (?1, ?2)",
            params![key, doc_json],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS complaints (
          key TEXT PRIMARY KEY,
          doc_json TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

impl ComplaintStore for SqliteStore {
    fn get_all(&self) -> Result<Snapshot> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, doc_json FROM complaints ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = Snapshot::new();
        for r in rows {
            let (key, doc_json) = r?;
            let complaint: Complaint = serde_json::from_str(&doc_json)?;
            snapshot.insert(key, complaint);
        }
        debug!(records = snapshot.len(), "Fetched complaint snapshot");
        Ok(snapshot)
    }

    fn append(&mut self, record: &Complaint) -> Result<String> {
        // v7 keys sort by creation time.
        let key = Uuid::now_v7().to_string();
        let doc_json = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO complaints (key, doc_json) VALUES (?1, ?2)",
            params![key, doc_json],
        )?;
        debug!(%key, protocol = %record.protocol, "Appended complaint");
        Ok(key)
    }

    fn update_fields(&mut self, key: &str, fields: &StaffUpdate) -> Result<()> {
        let tx = self.conn.transaction()?;
        let doc_json: Option<String> = tx
            .query_row(
                "SELECT doc_json FROM complaints WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        let doc_json = doc_json.ok_or_else(|| ComplaintError::NotFound(key.to_string()))?;

        let mut doc: Value = serde_json::from_str(&doc_json)?;
        let patch = serde_json::to_value(fields)?;
        match (doc.as_object_mut(), patch) {
            (Some(target), Value::Object(patch)) => {
                for (field, value) in patch {
                    target.insert(field, value);
                }
            }
            _ => {
                return Err(ComplaintError::Serialization(format!(
                    "document at {key} is not an object"
                )));
            }
        }

        tx.execute(
            "UPDATE complaints SET doc_json = ?1 WHERE key = ?2",
            params![serde_json::to_string(&doc)?, key],
        )?;
        tx.commit()?;
        debug!(key, "Updated staff fields");
        Ok(())
    }
}
