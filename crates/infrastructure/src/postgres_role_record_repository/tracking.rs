use super::*;

/// Loads a role and holds its row lock until the transaction ends.
pub(super) async fn lock_role(
    transaction: &mut Transaction<'_, Postgres>,
    role_arn: &str,
) -> AppResult<RoleRecord> {
    let row = sqlx::query_as::<_, RoleRecordRow>(
        r#"
        SELECT
            role_arn,
            role_name,
            create_date,
            max_session_duration,
            principal,
            assumed_users,
            assume_history,
            assume_permission
        FROM assumable_roles
        WHERE role_arn = $1
        FOR UPDATE
        "#,
    )
    .bind(role_arn)
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
    .ok_or_else(|| AppError::NotFound(format!("role '{role_arn}' was not found")))?;

    RoleRecord::try_from(row)
}

/// Writes the tracking columns of a locked role.
pub(super) async fn store_tracking(
    transaction: &mut Transaction<'_, Postgres>,
    record: &RoleRecord,
) -> AppResult<()> {
    let tracking = record.tracking();

    sqlx::query(
        r#"
        UPDATE assumable_roles
        SET assumed_users = $2,
            assume_history = $3,
            assume_permission = $4,
            updated_at = now()
        WHERE role_arn = $1
        "#,
    )
    .bind(record.role_arn())
    .bind(Json(tracking.assumed_users()))
    .bind(Json(tracking.assume_history()))
    .bind(Json(tracking.assume_permission()))
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to store role tracking: {error}")))?;

    Ok(())
}
