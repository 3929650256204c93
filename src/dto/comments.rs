use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::comments::CommentListRow;

/// Query string of every admin comment route. Each field is optional: an
/// absent one falls back to the remembered screen state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCommentsQuery {
    pub search: Option<String>,
    pub published: Option<String>,
    pub author_id: Option<String>,
    pub author_include: Option<String>,
    pub context: Option<String>,
    pub item_id: Option<String>,
    pub project: Option<String>,
    pub ordering: Option<String>,
    pub direction: Option<String>,
    pub limit: Option<String>,
    pub start: Option<String>,
    pub layout: Option<String>,
    pub reset: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentListItem {
    pub id: i64,
    pub project_id: Option<i64>,
    pub project_title: Option<String>,
    pub parent_id: Option<i64>,
    pub title: String,
    pub alias: String,
    pub description: String,
    pub context: String,
    pub item_id: i64,
    pub state: i32,
    pub access: i32,
    pub created: DateTime<Utc>,
    pub created_by: i64,
    pub author_name: Option<String>,
    pub modified: Option<DateTime<Utc>>,
    pub checked_out: Option<i64>,
    pub checked_out_time: Option<DateTime<Utc>>,
    pub editor: Option<String>,
    pub level: i32,
    pub lft: i32,
    pub rgt: i32,
}

impl From<CommentListRow> for CommentListItem {
    fn from(row: CommentListRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            project_title: row.project_title,
            parent_id: row.parent_id,
            title: row.title,
            alias: row.alias,
            description: row.description,
            context: row.context,
            item_id: row.item_id,
            state: row.state,
            access: row.access,
            created: row.created,
            created_by: row.created_by,
            author_name: row.author_name,
            modified: row.modified,
            checked_out: row.checked_out,
            checked_out_time: row.checked_out_time,
            editor: row.editor,
            level: row.level,
            lft: row.lft,
            rgt: row.rgt,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPagination {
    pub total: i64,
    pub limit: u32,
    pub start: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentListResponse {
    pub data: Vec<CommentListItem>,
    pub pagination: CommentPagination,
}

/// One entry of a filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption<T> {
    pub value: T,
    pub text: String,
}
