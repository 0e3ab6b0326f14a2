use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::Db;

/// Id of the user a bearer token was issued to.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub Uuid);

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_auth(State(db): State<Db>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;
    let header = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("invalid authorization format"))?;

    let token = match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => token,
        _ => return Err(ApiError::unauthorized("invalid authorization format")),
    };

    let user_id = db
        .read()
        .await
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| ApiError::unauthorized("invalid token"))?;

    req.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(req).await)
}
