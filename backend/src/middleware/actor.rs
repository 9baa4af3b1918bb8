use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::{
    error::AppError,
    models::actor::{Actor, ActorRole},
};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Reads the identity forwarded by the authenticating proxy.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id = header_value(headers, ACTOR_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing actor identity".to_string()))?;
    let role = header_value(headers, ACTOR_ROLE_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing actor role".to_string()))?
        .parse::<ActorRole>()
        .map_err(AppError::Unauthorized)?;
    Ok(Actor {
        id,
        name: header_value(headers, ACTOR_NAME_HEADER),
        role,
    })
}

pub async fn require_actor(mut req: Request, next: Next) -> Result<Response, AppError> {
    let actor = actor_from_headers(req.headers())?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
