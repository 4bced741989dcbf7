use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{require_auth, AuthUser},
    error::{AppError, AppResult},
    extract::AppPath,
    journeys::dto::JourneyItem,
    response::Success,
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/bookmarks", get(list_bookmarks))
        .route(
            "/journeys/:id/bookmark",
            post(add_bookmark).delete(remove_bookmark),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[instrument(skip(state))]
pub async fn list_bookmarks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Success<Vec<JourneyItem>>>> {
    let rows = state.bookmarks.list_for_user(user_id).await?;
    Ok(Json(Success::with(rows.into_iter().map(Into::into).collect())))
}

#[instrument(skip(state))]
pub async fn add_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(journey_id): AppPath<Uuid>,
) -> AppResult<Json<Success<()>>> {
    if !state.journeys.exists(journey_id).await? {
        return Err(AppError::NotFound("journey"));
    }
    state.bookmarks.add(user_id, journey_id).await?;
    info!(%user_id, %journey_id, "journey bookmarked");
    Ok(Json(Success::empty()))
}

#[instrument(skip(state))]
pub async fn remove_bookmark(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(journey_id): AppPath<Uuid>,
) -> AppResult<Json<Success<()>>> {
    if !state.bookmarks.remove(user_id, journey_id).await? {
        return Err(AppError::NotFound("bookmark"));
    }
    Ok(Json(Success::empty()))
}
