use crate::database::models::{NewPostRecord, NewThreadRecord, PostRecord, ThreadRecord};
use crate::database::repositories::{PostRepository, ThreadRepository};
use crate::database::Database;
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page shape for list endpoints.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Distinguishes store-level constraint violations (duplicate thread name,
/// dangling post thread reference) from plain storage failures.
fn map_store_error(err: anyhow::Error, what: &str) -> ForumError {
    let constraint = matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(inner, _))
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    );
    if constraint {
        ForumError::Conflict(format!("{what} violates a store constraint"))
    } else {
        ForumError::Storage(err)
    }
}

#[derive(Clone)]
pub struct ForumService {
    database: Database,
}

impl ForumService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn create_thread(&self, input: CreateThreadInput) -> Result<ThreadView, ForumError> {
        if input.name.trim().is_empty() {
            return Err(ForumError::InvalidInput(
                "thread name may not be empty".into(),
            ));
        }
        let now = now_utc_iso();
        let record = NewThreadRecord {
            name: input.name,
            created_at: now.clone(),
            updated_at: now,
        };
        self.database
            .with_repositories(|repos| repos.threads().create(&record))
            .map(ThreadView::from_record)
            .map_err(|err| map_store_error(err, "thread"))
    }

    pub fn list_threads(&self, skip: usize, limit: usize) -> Result<Vec<ThreadView>, ForumError> {
        let records = self
            .database
            .with_repositories(|repos| repos.threads().list(skip, limit))?;
        Ok(records.into_iter().map(ThreadView::from_record).collect())
    }

    pub fn get_thread(&self, id: i64) -> Result<Option<ThreadView>, ForumError> {
        let record = self
            .database
            .with_repositories(|repos| repos.threads().get(id))?;
        Ok(record.map(ThreadView::from_record))
    }

    /// Merges only the fields present in the patch; absent records come back
    /// as `None` and leave the store untouched.
    pub fn update_thread(
        &self,
        id: i64,
        patch: UpdateThreadInput,
    ) -> Result<Option<ThreadView>, ForumError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ForumError::InvalidInput(
                    "thread name may not be empty".into(),
                ));
            }
        }
        self.database
            .with_repositories(|repos| {
                let threads = repos.threads();
                let Some(mut record) = threads.get(id)? else {
                    return Ok(None);
                };
                if let Some(name) = patch.name {
                    record.name = name;
                }
                record.updated_at = now_utc_iso();
                threads.update(&record)?;
                Ok(Some(record))
            })
            .map(|record| record.map(ThreadView::from_record))
            .map_err(|err| map_store_error(err, "thread"))
    }

    pub fn delete_thread(&self, id: i64) -> Result<bool, ForumError> {
        Ok(self
            .database
            .with_repositories(|repos| repos.threads().delete(id))?)
    }

    pub fn create_post(&self, input: CreatePostInput) -> Result<PostView, ForumError> {
        if input.name.trim().is_empty() {
            return Err(ForumError::InvalidInput(
                "post name may not be empty".into(),
            ));
        }
        let now = now_utc_iso();
        let record = NewPostRecord {
            name: input.name,
            thread_id: input.thread_id,
            created_at: now.clone(),
            updated_at: now,
        };
        self.database
            .with_repositories(|repos| repos.posts().create(&record))
            .map(PostView::from_record)
            .map_err(|err| map_store_error(err, "post"))
    }

    pub fn list_posts(&self, skip: usize, limit: usize) -> Result<Vec<PostView>, ForumError> {
        let records = self
            .database
            .with_repositories(|repos| repos.posts().list(skip, limit))?;
        Ok(records.into_iter().map(PostView::from_record).collect())
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostView>, ForumError> {
        let record = self
            .database
            .with_repositories(|repos| repos.posts().get(id))?;
        Ok(record.map(PostView::from_record))
    }

    pub fn update_post(
        &self,
        id: i64,
        patch: UpdatePostInput,
    ) -> Result<Option<PostView>, ForumError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ForumError::InvalidInput(
                    "post name may not be empty".into(),
                ));
            }
        }
        self.database
            .with_repositories(|repos| {
                let posts = repos.posts();
                let Some(mut record) = posts.get(id)? else {
                    return Ok(None);
                };
                if let Some(name) = patch.name {
                    record.name = name;
                }
                if let Some(thread_id) = patch.thread_id {
                    record.thread_id = thread_id;
                }
                record.updated_at = now_utc_iso();
                posts.update(&record)?;
                Ok(Some(record))
            })
            .map(|record| record.map(PostView::from_record))
            .map_err(|err| map_store_error(err, "post"))
    }

    pub fn delete_post(&self, id: i64) -> Result<bool, ForumError> {
        Ok(self
            .database
            .with_repositories(|repos| repos.posts().delete(id))?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub name: String,
    pub thread_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThreadInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateThreadInput {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub name: String,
    pub thread_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thread_id: Option<i64>,
}

impl ThreadView {
    fn from_record(record: ThreadRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl PostView {
    fn from_record(record: PostRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            thread_id: record.thread_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_service() -> ForumService {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn);
        db.ensure_migrations().expect("migrations");
        ForumService::new(db)
    }

    #[test]
    fn create_then_get_round_trips() {
        let service = setup_service();
        let created = service
            .create_thread(CreateThreadInput {
                name: "general".into(),
            })
            .expect("create thread");
        assert!(created.id > 0);
        assert!(!created.created_at.is_empty());

        let fetched = service
            .get_thread(created.id)
            .expect("get thread")
            .expect("thread exists");
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    fn empty_thread_name_is_invalid() {
        let service = setup_service();
        let err = service
            .create_thread(CreateThreadInput { name: "  ".into() })
            .unwrap_err();
        assert!(matches!(err, ForumError::InvalidInput(_)));
    }

    #[test]
    fn duplicate_thread_name_is_a_conflict() {
        let service = setup_service();
        service
            .create_thread(CreateThreadInput {
                name: "general".into(),
            })
            .expect("first create");
        let err = service
            .create_thread(CreateThreadInput {
                name: "general".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));
    }

    #[test]
    fn partial_update_leaves_unset_fields_untouched() {
        let service = setup_service();
        let thread = service
            .create_thread(CreateThreadInput {
                name: "general".into(),
            })
            .expect("create thread");
        let post = service
            .create_post(CreatePostInput {
                name: "first".into(),
                thread_id: thread.id,
            })
            .expect("create post");

        let updated = service
            .update_post(
                post.id,
                UpdatePostInput {
                    name: Some("renamed".into()),
                    thread_id: None,
                },
            )
            .expect("update post")
            .expect("post exists");
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.thread_id, thread.id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[test]
    fn update_of_missing_record_returns_none() {
        let service = setup_service();
        let result = service
            .update_thread(
                42,
                UpdateThreadInput {
                    name: Some("nobody".into()),
                },
            )
            .expect("update call");
        assert!(result.is_none());
    }

    #[test]
    fn delete_reports_presence_and_removes_record() {
        let service = setup_service();
        let thread = service
            .create_thread(CreateThreadInput {
                name: "general".into(),
            })
            .expect("create thread");

        assert!(service.delete_thread(thread.id).expect("first delete"));
        assert!(!service.delete_thread(thread.id).expect("second delete"));
        assert!(service.get_thread(thread.id).expect("get").is_none());
    }

    #[test]
    fn post_with_dangling_thread_reference_is_a_conflict() {
        let service = setup_service();
        let err = service
            .create_post(CreatePostInput {
                name: "orphan".into(),
                thread_id: 999,
            })
            .unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));
    }

    #[test]
    fn list_respects_skip_and_limit() {
        let service = setup_service();
        for name in ["a", "b", "c", "d"] {
            service
                .create_thread(CreateThreadInput { name: name.into() })
                .expect("create thread");
        }
        let page = service.list_threads(1, 2).expect("list threads");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "b");
        assert_eq!(page[1].name, "c");
    }
}
