use sqlx::PgPool;

use crate::{error::AppError, models::users::AccessContext};

/// Loads what the caller may see: the admin flag and the view levels granted
/// through their groups, plus the public level every visitor holds.
pub async fn load_access_context(
    pool: &PgPool,
    user_id: i64,
    public_level: i32,
) -> Result<AccessContext, AppError> {
    let is_admin = crate::log_query_fetch_optional!(
        "users.find_admin_flag",
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_admin
            FROM core.user
            WHERE id = $1
            AND blocked = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
    )?
    .ok_or_else(|| AppError::Unauthorized("Unknown or blocked user".to_string()))?;

    let levels = crate::log_query_fetch_all!(
        "users.list_view_levels",
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT DISTINCT access_level
            FROM core.user_view_level
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
    )?;

    Ok(AccessContext::new(
        user_id,
        is_admin,
        levels.into_iter().chain(std::iter::once(public_level)),
    ))
}
