use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::app::{SharedAuthenticator, blocking, errors};
use crate::context::PrincipalContext;

/// Resolve the bearer token to an active user or answer 401.
///
/// Runs on every protected request; there is no session cache.
pub async fn auth_middleware(
    State(auth): State<SharedAuthenticator>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = authorization_header(req.headers());

    let resolved = blocking(move || auth.resolve_user(header.as_deref(), Utc::now())).await?;
    let user = match resolved {
        Ok(Some(user)) => user,
        Ok(None) => return Err(errors::unauthenticated()),
        Err(e) => return Err(errors::auth_error_to_response(e.into())),
    };

    req.extensions_mut().insert(PrincipalContext::new(user));
    Ok(next.run(req).await)
}

/// The raw `Authorization` value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
