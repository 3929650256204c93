use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        comments::{AuthorOptionRow, CommentListRow, ContextItemRow},
        filters::{AuthorScope, ListFilter},
        users::AccessContext,
    },
    query::{
        comments::{
            build_authors_query, build_context_items_query, build_contexts_query,
            build_list_query, cols,
        },
        render::{render_count, render_select},
    },
};

pub async fn list_comments(
    pool: &PgPool,
    filter: &ListFilter,
    access: &AccessContext,
) -> Result<Vec<CommentListRow>, AppError> {
    let mut builder = render_select(&build_list_query(filter, access));
    let sql = builder.sql().to_owned();
    let rows = crate::log_query_fetch_all!(
        "comments.list_comments",
        &sql,
        builder.build_query_as::<CommentListRow>().fetch_all(pool)
    )?;

    Ok(rows)
}

/// Total number of comments matching the filter, ignoring the page window.
pub async fn count_comments(
    pool: &PgPool,
    filter: &ListFilter,
    access: &AccessContext,
) -> Result<i64, AppError> {
    let mut builder = render_count(&build_list_query(filter, access), cols::ID);
    let sql = builder.sql().to_owned();
    let total = crate::log_query_fetch_one!(
        "comments.count_comments",
        &sql,
        builder.build_query_scalar::<i64>().fetch_one(pool)
    )?;

    Ok(total)
}

pub async fn list_author_options(
    pool: &PgPool,
    project: Option<i64>,
    scope: AuthorScope,
) -> Result<Vec<AuthorOptionRow>, AppError> {
    let Some(query) = build_authors_query(project, scope) else {
        return Ok(Vec::new());
    };
    let mut builder = render_select(&query);
    let sql = builder.sql().to_owned();
    let rows = crate::log_query_fetch_all!(
        "comments.list_author_options",
        &sql,
        builder.build_query_as::<AuthorOptionRow>().fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn list_contexts(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let mut builder = render_select(&build_contexts_query());
    let sql = builder.sql().to_owned();
    let rows = crate::log_query_fetch_all!(
        "comments.list_contexts",
        &sql,
        builder.build_query_scalar::<String>().fetch_all(pool)
    )?;

    Ok(rows)
}

pub async fn list_context_items(
    pool: &PgPool,
    context: Option<&str>,
    project: Option<i64>,
) -> Result<Vec<ContextItemRow>, AppError> {
    let Some(query) = build_context_items_query(context, project) else {
        return Ok(Vec::new());
    };
    let mut builder = render_select(&query);
    let sql = builder.sql().to_owned();
    let rows = crate::log_query_fetch_all!(
        "comments.list_context_items",
        &sql,
        builder.build_query_as::<ContextItemRow>().fetch_all(pool)
    )?;

    Ok(rows)
}
