use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{info, warn};

use crate::dto::{IssueSessionRequest, IssuedSessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn issue_session_handler(
    State(state): State<AppState>,
    Json(payload): Json<IssueSessionRequest>,
) -> ApiResult<(StatusCode, Json<IssuedSessionResponse>)> {
    let client = payload.client()?;

    let issued = state
        .assume_role_service
        .issue_session(&client, payload.role_arn.as_str(), payload.duration_seconds)
        .await
        .inspect_err(|error| {
            warn!(role_arn = %payload.role_arn, error = %error, "session issuance refused");
        })?;

    info!(
        role_arn = %issued.role_arn,
        principal_arn = %issued.principal_arn,
        expires_at = %issued.session.expires_at(),
        "session issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(IssuedSessionResponse::from(issued)),
    ))
}
