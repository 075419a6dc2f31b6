//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use cashdesk_core::access::{Operation, Role};
use cashdesk_core::workflow::WorkflowError;
use cashdesk_shared::{Claims, JwtError};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "MISSING_TOKEN",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (error, message) = match e {
                JwtError::Expired => ("TOKEN_EXPIRED", "Token has expired"),
                _ => ("INVALID_TOKEN", "Invalid or malformed token"),
            };

            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response()
        }
    }
}

/// Extractor for authenticated user claims.
///
/// Use this in handlers to get the authenticated user's identity:
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let user_id = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Returns the user's role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Returns the branch IDs the user is assigned to.
    #[must_use]
    pub fn branches(&self) -> &[Uuid] {
        &self.0.branches
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }

    /// Checks the permission table for the given operation.
    ///
    /// # Errors
    ///
    /// Returns a 403 response when the role is unknown or does not grant
    /// the operation.
    pub fn require(&self, operation: Operation) -> Result<Role, ApiError> {
        let role = Role::parse(self.role()).ok_or_else(|| {
            ApiError::from(WorkflowError::RoleNotPermitted {
                role: self.role().to_string(),
                operation: operation.describe().to_string(),
            })
        })?;

        if role.allows(operation) {
            Ok(role)
        } else {
            Err(WorkflowError::RoleNotPermitted {
                role: role.as_str().to_string(),
                operation: operation.describe().to_string(),
            }
            .into())
        }
    }

    /// Checks branch scope for the given branch. Admins are unscoped.
    ///
    /// # Errors
    ///
    /// Returns a 403 response when the branch is outside the caller's
    /// assigned set.
    pub fn require_branch(&self, role: Role, branch_id: Uuid) -> Result<(), ApiError> {
        if role == Role::Admin || self.0.is_assigned_to(branch_id) {
            Ok(())
        } else {
            Err(WorkflowError::BranchNotAssigned { branch_id }.into())
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "UNAUTHORIZED",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn auth(role: &str, branches: Vec<Uuid>) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            role,
            branches,
            Utc::now() + Duration::minutes(15),
        ))
    }

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("Basic abc", None)]
    #[case("Bearer", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_bearer_token(header), expected);
    }

    #[test]
    fn test_require_checks_permission_table() {
        let user = auth("user", vec![]);
        assert!(user.require(Operation::CreateForm).is_ok());
        assert!(user.require(Operation::AccountantDecide).is_err());

        let unknown = auth("owner", vec![]);
        assert!(unknown.require(Operation::CreateForm).is_err());
    }

    #[test]
    fn test_require_branch_scoping() {
        let branch = Uuid::new_v4();
        let accountant = auth("accountant", vec![branch]);
        let role = accountant.require(Operation::AccountantDecide).unwrap();
        assert!(accountant.require_branch(role, branch).is_ok());
        assert!(accountant.require_branch(role, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_admin_is_unscoped() {
        let admin = auth("admin", vec![]);
        let role = admin.require(Operation::AdminDecide).unwrap();
        assert!(admin.require_branch(role, Uuid::new_v4()).is_ok());
    }
}
