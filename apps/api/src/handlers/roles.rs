use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

use crate::dto::{
    ClientCredentialsRequest, IssuanceCheckResponse, PrincipalRolesResponse, RoleRecordResponse,
    RoleSyncResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssuanceCheckQuery {
    pub role_arn: String,
    pub principal_arn: String,
}

#[derive(Debug, Deserialize)]
pub struct PrincipalRolesQuery {
    pub principal_arn: String,
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleRecordResponse>>> {
    let roles = state
        .assume_role_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleRecordResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn sync_roles_handler(
    State(state): State<AppState>,
    Json(payload): Json<ClientCredentialsRequest>,
) -> ApiResult<Json<RoleSyncResponse>> {
    let client = payload.into_client()?;
    let summary = state.assume_role_service.sync_roles(&client).await?;

    info!(
        synchronized = summary.synchronized,
        skipped = summary.skipped,
        "role sync completed"
    );

    Ok(Json(RoleSyncResponse::from(summary)))
}

pub async fn issuance_check_handler(
    State(state): State<AppState>,
    Query(query): Query<IssuanceCheckQuery>,
) -> ApiResult<Json<IssuanceCheckResponse>> {
    let check = state
        .assume_role_service
        .check_issuance(query.role_arn.as_str(), query.principal_arn.as_str())
        .await?;

    Ok(Json(IssuanceCheckResponse::new(
        query.role_arn,
        query.principal_arn,
        check,
    )))
}

pub async fn principal_roles_handler(
    State(state): State<AppState>,
    Query(query): Query<PrincipalRolesQuery>,
) -> ApiResult<Json<PrincipalRolesResponse>> {
    let views = state
        .assume_role_service
        .roles_for_principal(query.principal_arn.as_str())
        .await?;

    Ok(Json(PrincipalRolesResponse::new(query.principal_arn, views)))
}

pub async fn caller_roles_handler(
    State(state): State<AppState>,
    Json(payload): Json<ClientCredentialsRequest>,
) -> ApiResult<Json<PrincipalRolesResponse>> {
    let client = payload.into_client()?;
    let (principal_arn, views) = state.assume_role_service.roles_for_client(&client).await?;

    Ok(Json(PrincipalRolesResponse::new(principal_arn, views)))
}
