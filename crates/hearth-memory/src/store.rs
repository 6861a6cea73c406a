//! The memory store: add, list, search, and delete long-term facts.
//!
//! Duplicate detection: adding a record whose content and subject match an
//! existing row reinforces that row's confidence instead of inserting a
//! second copy. Records are otherwise never mutated in place.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::debug;
use uuid::Uuid;

use hearth_core::types::{clamp_confidence, MemoryCategory, MemoryRecord};

use crate::db::Database;
use crate::error::MemoryError;

/// Persistent store of long-term memory records.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    db: Arc<Database>,
}

impl MemoryStore {
    /// Open a store backed by a database file.
    pub fn open(path: &Path) -> Result<Self, MemoryError> {
        Ok(Self {
            db: Arc::new(Database::open(path)?),
        })
    }

    /// In-memory store for testing.
    pub fn in_memory() -> Result<Self, MemoryError> {
        Ok(Self {
            db: Arc::new(Database::in_memory()?),
        })
    }

    /// Add a record, clamping confidence to [0,1].
    ///
    /// If a record with identical content and subject already exists, its
    /// confidence is reinforced (moved halfway toward 1.0, floored at the
    /// incoming value) and the existing record is returned instead.
    pub fn add(
        &self,
        content: &str,
        category: MemoryCategory,
        subject: Option<&str>,
        confidence: f64,
    ) -> Result<MemoryRecord, MemoryError> {
        let confidence = clamp_confidence(confidence);

        if let Some(existing) = self.find_duplicate(content, subject)? {
            let reinforced =
                clamp_confidence((existing.confidence + (1.0 - existing.confidence) / 2.0).max(confidence));
            self.db.with_conn(|conn| {
                conn.execute(
                    "UPDATE memories SET confidence = ?1 WHERE id = ?2",
                    params![reinforced, existing.id.to_string()],
                )?;
                Ok(())
            })?;
            debug!(
                id = %existing.id,
                confidence = reinforced,
                "Reinforced duplicate memory"
            );
            return Ok(MemoryRecord {
                confidence: reinforced,
                ..existing
            });
        }

        let record = MemoryRecord::new(content, category, subject.map(str::to_string), confidence);
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO memories (id, content, category, subject, confidence, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.to_string(),
                    record.content,
                    record.category.as_str(),
                    record.subject,
                    record.confidence,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;
        debug!(id = %record.id, category = record.category.as_str(), "Memory added");
        Ok(record)
    }

    /// All records, newest first.
    pub fn all(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.query(
            "SELECT id, content, category, subject, confidence, created_at
             FROM memories ORDER BY created_at DESC",
            &[],
        )
    }

    /// The `limit` newest records.
    pub fn recent(&self, limit: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.query(
            "SELECT id, content, category, subject, confidence, created_at
             FROM memories ORDER BY created_at DESC LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    /// Case-insensitive substring search over content and subject.
    pub fn search(&self, query: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let pattern = format!("%{}%", query.to_lowercase());
        self.query(
            "SELECT id, content, category, subject, confidence, created_at
             FROM memories
             WHERE LOWER(content) LIKE ?1 OR LOWER(IFNULL(subject, '')) LIKE ?1
             ORDER BY created_at DESC",
            &[&pattern],
        )
    }

    /// Delete a record by id.
    pub fn delete(&self, id: Uuid) -> Result<(), MemoryError> {
        let affected = self.db.with_conn(|conn| {
            conn.execute("DELETE FROM memories WHERE id = ?1", params![id.to_string()])
                .map_err(MemoryError::from)
        })?;
        if affected == 0 {
            return Err(MemoryError::NotFound(id));
        }
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, MemoryError> {
        self.db.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }

    fn find_duplicate(
        &self,
        content: &str,
        subject: Option<&str>,
    ) -> Result<Option<MemoryRecord>, MemoryError> {
        let rows = self.query(
            "SELECT id, content, category, subject, confidence, created_at
             FROM memories WHERE content = ?1 AND subject IS ?2",
            &[&content, &subject],
        )?;
        Ok(rows.into_iter().next())
    }

    fn query(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(args, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (id, content, category, subject, confidence, created_at) = row?;
                records.push(MemoryRecord {
                    id: Uuid::parse_str(&id)
                        .map_err(|e| MemoryError::Storage(format!("Bad record id: {}", e)))?,
                    content,
                    category: MemoryCategory::parse_or_fact(&category),
                    subject,
                    confidence,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| MemoryError::Storage(format!("Bad timestamp: {}", e)))?,
                });
            }
            Ok(records)
        })
    }
}
