use axum::Json;
use axum::extract::State;
use rolegate_domain::AssumePermission;
use tracing::info;

use crate::dto::{RolePermissionOverviewResponse, RoleRecordResponse, UpdatePermissionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn permission_overview_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RolePermissionOverviewResponse>>> {
    let overview = state
        .assume_role_service
        .permission_overview()
        .await?
        .into_iter()
        .map(RolePermissionOverviewResponse::from)
        .collect();

    Ok(Json(overview))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<RoleRecordResponse>> {
    let value = AssumePermission::from_transport(payload.value.as_str())?;

    let record = state
        .assume_role_service
        .update_permission(
            payload.role_arn.as_str(),
            payload.principal_arn.as_str(),
            value,
        )
        .await?;

    info!(
        role_arn = %payload.role_arn,
        principal_arn = %payload.principal_arn,
        permission = value.as_str(),
        "assume permission updated"
    );

    Ok(Json(RoleRecordResponse::from(record)))
}
