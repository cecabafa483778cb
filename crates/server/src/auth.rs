use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use common::types::split_list;
use tracing::warn;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Comma separated groups taken from the upstream authorizer's claims.
pub const GROUPS_HEADER: &str = "x-authorizer-groups";

/// Middleware: require at least one group listed in `auth.valid_roles`.
pub async fn require_role(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let groups = match req.headers().get(GROUPS_HEADER).and_then(|v| v.to_str().ok()) {
        Some(raw) => split_list(raw),
        None => return Err(JsonApiError::unauthorized("missing authorizer claims")),
    };
    if !groups.iter().any(|g| state.valid_roles.contains(g)) {
        warn!(?groups, path = %req.uri().path(), "role not permitted");
        return Err(JsonApiError::forbidden("none of the caller's roles may perform this action"));
    }
    Ok(next.run(req).await)
}
