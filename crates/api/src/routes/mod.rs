//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod approvals;
pub mod branches;
pub mod documents;
pub mod forms;
pub mod health;
pub mod reports;
pub mod templates;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(branches::routes())
        .merge(templates::routes())
        .merge(users::routes())
        .merge(forms::routes())
        .merge(approvals::routes())
        .merge(reports::routes())
        .merge(documents::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new().merge(health::routes()).merge(protected_routes)
}
