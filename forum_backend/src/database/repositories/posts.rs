use crate::database::models::{NewPostRecord, PostRecord};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqlitePostRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &NewPostRecord) -> Result<PostRecord> {
        self.conn.execute(
            r#"
            INSERT INTO posts (name, thread_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.name,
                record.thread_id,
                record.created_at,
                record.updated_at
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get(id)?.context("post insert lost newly created row")
    }

    fn get(&self, id: i64) -> Result<Option<PostRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, thread_id, created_at, updated_at
                FROM posts
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(PostRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        thread_id: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    fn list(&self, offset: usize, limit: usize) -> Result<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, thread_id, created_at, updated_at
            FROM posts
            ORDER BY id ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(PostRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                thread_id: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn update(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE posts
            SET name = ?1, thread_id = ?2, updated_at = ?3
            WHERE id = ?4
            "#,
            params![
                record.name,
                record.thread_id,
                record.updated_at,
                record.id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            r#"
            DELETE FROM posts
            WHERE id = ?1
            "#,
            params![id],
        )?;
        Ok(rows > 0)
    }
}
