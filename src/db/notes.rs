use crate::domain::ports::NoteCounter;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub customer_id: String,
    pub note_text: String,
    pub author_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, customer_id: &str, note_text: &str, author: &str) -> Result<Note> {
        let id = sqlx::query(
            "INSERT INTO notes (customer_id, note_text, author_name) VALUES (?, ?, ?)",
        )
        .bind(customer_id)
        .bind(note_text)
        .bind(author)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    pub async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }
}

#[async_trait]
impl NoteCounter for NoteStore {
    async fn count_by_customer(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT customer_id, COUNT(*) FROM notes GROUP BY customer_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
