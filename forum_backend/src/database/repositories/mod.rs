mod posts;
mod threads;

use super::models::{NewPostRecord, NewThreadRecord, PostRecord, ThreadRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait ThreadRepository {
    fn create(&self, record: &NewThreadRecord) -> Result<ThreadRecord>;
    fn get(&self, id: i64) -> Result<Option<ThreadRecord>>;
    fn list(&self, offset: usize, limit: usize) -> Result<Vec<ThreadRecord>>;
    fn update(&self, record: &ThreadRecord) -> Result<()>;
    fn delete(&self, id: i64) -> Result<bool>;
}

pub trait PostRepository {
    fn create(&self, record: &NewPostRecord) -> Result<PostRecord>;
    fn get(&self, id: i64) -> Result<Option<PostRecord>>;
    fn list(&self, offset: usize, limit: usize) -> Result<Vec<PostRecord>>;
    fn update(&self, record: &PostRecord) -> Result<()>;
    fn delete(&self, id: i64) -> Result<bool>;
}

/// Hands out rusqlite-backed repository implementations borrowing one
/// connection.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn threads(&self) -> impl ThreadRepository + '_ {
        threads::SqliteThreadRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATIONS;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(MIGRATIONS).expect("migrations");
        conn
    }

    #[test]
    fn thread_create_assigns_id_and_round_trips() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        let created = repos
            .threads()
            .create(&NewThreadRecord {
                name: "general".into(),
                created_at: "2024-01-01T00:00:00+00:00".into(),
                updated_at: "2024-01-01T00:00:00+00:00".into(),
            })
            .unwrap();
        assert!(created.id > 0);

        let fetched = repos.threads().get(created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn thread_list_pages_in_insertion_order() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        for name in ["a", "b", "c"] {
            repos
                .threads()
                .create(&NewThreadRecord {
                    name: name.into(),
                    created_at: "2024-01-01T00:00:00+00:00".into(),
                    updated_at: "2024-01-01T00:00:00+00:00".into(),
                })
                .unwrap();
        }

        let page = repos.threads().list(1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b");
    }

    #[test]
    fn thread_delete_reports_row_presence() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        let created = repos
            .threads()
            .create(&NewThreadRecord {
                name: "doomed".into(),
                created_at: "2024-01-01T00:00:00+00:00".into(),
                updated_at: "2024-01-01T00:00:00+00:00".into(),
            })
            .unwrap();

        assert!(repos.threads().delete(created.id).unwrap());
        assert!(!repos.threads().delete(created.id).unwrap());
        assert!(repos.threads().get(created.id).unwrap().is_none());
    }

    #[test]
    fn duplicate_thread_name_is_rejected() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        let record = NewThreadRecord {
            name: "general".into(),
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        };
        repos.threads().create(&record).unwrap();
        assert!(repos.threads().create(&record).is_err());
    }

    #[test]
    fn post_repository_enforces_thread_reference() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);

        let orphan = NewPostRecord {
            name: "dangling".into(),
            thread_id: 999,
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        };
        assert!(repos.posts().create(&orphan).is_err());

        let thread = repos
            .threads()
            .create(&NewThreadRecord {
                name: "general".into(),
                created_at: "2024-01-01T00:00:00+00:00".into(),
                updated_at: "2024-01-01T00:00:00+00:00".into(),
            })
            .unwrap();
        let post = repos
            .posts()
            .create(&NewPostRecord {
                name: "hello".into(),
                thread_id: thread.id,
                created_at: "2024-01-01T00:00:01+00:00".into(),
                updated_at: "2024-01-01T00:00:01+00:00".into(),
            })
            .unwrap();
        assert_eq!(post.thread_id, thread.id);

        // deleting the thread cascades to its posts
        assert!(repos.threads().delete(thread.id).unwrap());
        assert!(repos.posts().get(post.id).unwrap().is_none());
    }
}
