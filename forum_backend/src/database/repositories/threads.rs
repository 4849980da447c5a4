use crate::database::models::{NewThreadRecord, ThreadRecord};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteThreadRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::ThreadRepository for SqliteThreadRepository<'conn> {
    fn create(&self, record: &NewThreadRecord) -> Result<ThreadRecord> {
        self.conn.execute(
            r#"
            INSERT INTO threads (name, created_at, updated_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![record.name, record.created_at, record.updated_at],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get(id)?
            .context("thread insert lost newly created row")
    }

    fn get(&self, id: i64) -> Result<Option<ThreadRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, name, created_at, updated_at
                FROM threads
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(ThreadRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn list(&self, offset: usize, limit: usize) -> Result<Vec<ThreadRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, created_at, updated_at
            FROM threads
            ORDER BY id ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(ThreadRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut threads = Vec::new();
        for row in rows {
            threads.push(row?);
        }
        Ok(threads)
    }

    fn update(&self, record: &ThreadRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE threads
            SET name = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
            params![record.name, record.updated_at, record.id],
        )?;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            DELETE FROM threads
            WHERE id = ?1
            "#,
            params![id],
        )?;
        Ok(rows > 0)
    }
}
