use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use huddle_core::{ActorId, AppError};

use crate::error::ApiResult;
use crate::state::AppState;

/// Reads the actor verified by the upstream gateway from the trusted header.
///
/// The system actor is internal-only and never accepted from a request.
pub async fn require_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let value = request
        .headers()
        .get(&state.actor_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let actor = ActorId::new(value)
        .map_err(|_| AppError::Unauthorized("invalid actor identity".to_owned()))?;
    if actor.is_system() {
        return Err(AppError::Unauthorized(
            "the system actor cannot be used by clients".to_owned(),
        )
        .into());
    }

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
