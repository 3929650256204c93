use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Alias of the synthetic nested-set anchor. Never user content.
pub const ROOT_ALIAS: &str = "root";

/// Publication states stored in collab.comment.state.
pub const STATE_UNPUBLISHED: i32 = 0;
pub const STATE_PUBLISHED: i32 = 1;

/// One row of the admin list: comment columns plus the joined display names.
/// Every joined column is nullable because the joins are left outer joins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentListRow {
    pub id: i64,
    pub project_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub title: String,
    pub alias: String,
    pub description: String,
    pub context: String,
    pub item_id: i64,
    pub checked_out: Option<i64>,
    pub checked_out_time: Option<DateTime<Utc>>,
    pub state: i32,
    pub access: i32,
    pub created: DateTime<Utc>,
    pub created_by: i64,
    pub modified: Option<DateTime<Utc>>,
    pub lft: i32,
    pub rgt: i32,
    pub level: i32,
    pub editor: Option<String>,
    pub author_name: Option<String>,
    pub project_title: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AuthorOptionRow {
    pub value: i64,
    pub text: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContextItemRow {
    pub value: i64,
    pub text: Option<String>,
}
