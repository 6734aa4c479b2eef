use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::config::AdminCredentials;
use crate::db::AppState;
use crate::error::AppError;
use crate::util::extract_basic_credentials;

/// Inserted into request extensions once the admin gate has passed.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub username: String,
}

fn credentials_match(expected: &AdminCredentials, username: &str, password: &str) -> bool {
    // Both halves are always compared so timing does not reveal which one was wrong.
    let user_ok = expected.username.as_bytes().ct_eq(username.as_bytes());
    let pass_ok = expected.password.as_bytes().ct_eq(password.as_bytes());
    (user_ok & pass_ok).into()
}

/// Authenticate an admin from `Authorization: Basic ...`.
/// Nothing is remembered between requests; every call is checked again.
pub fn authenticate_admin(
    expected: Option<&AdminCredentials>,
    headers: &HeaderMap,
) -> Result<AdminContext, StatusCode> {
    let expected = expected.ok_or(StatusCode::UNAUTHORIZED)?;
    let (username, password) = extract_basic_credentials(headers).ok_or(StatusCode::UNAUTHORIZED)?;

    if !credentials_match(expected, &username, &password) {
        tracing::warn!(username = %username, "Admin authentication failed");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(AdminContext { username })
}

pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = authenticate_admin(state.admin.as_ref(), request.headers())
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
