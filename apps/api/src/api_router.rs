use axum::Router;
use axum::routing::{get, post};
use rolegate_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let api_routes = Router::new()
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler),
        )
        .route(
            "/api/roles/sync",
            post(handlers::roles::sync_roles_handler),
        )
        .route(
            "/api/roles/permissions",
            get(handlers::permissions::permission_overview_handler)
                .put(handlers::permissions::update_permission_handler),
        )
        .route(
            "/api/roles/issuance",
            get(handlers::roles::issuance_check_handler),
        )
        .route(
            "/api/principals/roles",
            get(handlers::roles::principal_roles_handler)
                .post(handlers::roles::caller_roles_handler),
        )
        .route(
            "/api/sessions",
            post(handlers::sessions::issue_session_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes)
        .layer(build_cors_layer(frontend_url)?)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
