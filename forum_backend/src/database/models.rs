/// Row as stored in `threads`. Ids and timestamps are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert shape for `threads`; the id comes from the store.
#[derive(Debug, Clone)]
pub struct NewThreadRecord {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    pub id: i64,
    pub name: String,
    pub thread_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPostRecord {
    pub name: String,
    pub thread_id: i64,
    pub created_at: String,
    pub updated_at: String,
}
