use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{
    ImageUpload, JourneyItem, JourneySummary, NewJourneyForm, UpdateJourneyRequest,
};
use super::services;
use crate::{
    auth::{require_auth, AuthUser},
    error::{AppError, AppResult},
    extract::{AppJson, AppMultipart, AppPath},
    response::Success,
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/journeys", get(list_journeys))
        .route("/journeys/:id", get(get_journey))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/journeys", post(create_journey))
        .route("/journeys/:id", axum::routing::patch(update_journey).delete(delete_journey))
        .route("/me/journeys", get(my_journeys))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_journeys(
    State(state): State<AppState>,
) -> AppResult<Json<Success<Vec<JourneyItem>>>> {
    let rows = state.journeys.list_all().await?;
    Ok(Json(Success::with(rows.into_iter().map(Into::into).collect())))
}

#[instrument(skip(state))]
pub async fn get_journey(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Success<JourneyItem>>> {
    let row = state
        .journeys
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("journey"))?;
    Ok(Json(Success::with(row.into())))
}

#[instrument(skip(state))]
pub async fn my_journeys(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Success<Vec<JourneyItem>>>> {
    let rows = state.journeys.list_by_user(user_id).await?;
    Ok(Json(Success::with(rows.into_iter().map(Into::into).collect())))
}

/// POST /journeys (multipart)
/// Fields: title, description, image (file).
#[instrument(skip(state, mp))]
pub async fn create_journey(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppMultipart(mp): AppMultipart,
) -> AppResult<(StatusCode, Json<Success<JourneySummary>>)> {
    let form = read_form(mp).await?;
    let journey = services::validate(form)?;
    let created = services::create_journey(&state, user_id, journey).await?;
    Ok((StatusCode::CREATED, Json(Success::with(created))))
}

#[instrument(skip(state, payload))]
pub async fn update_journey(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateJourneyRequest>,
) -> AppResult<Json<Success<JourneySummary>>> {
    let patch = payload.normalized()?;
    let updated = state
        .journeys
        .update_owned(id, user_id, patch.title.as_deref(), patch.description.as_deref())
        .await?
        .ok_or(AppError::NotFound("journey"))?;
    Ok(Json(Success::with(updated.into())))
}

#[instrument(skip(state))]
pub async fn delete_journey(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Success<Uuid>>> {
    services::delete_journey(&state, user_id, id).await?;
    Ok(Json(Success::with(id)))
}

async fn read_form(mut mp: Multipart) -> AppResult<NewJourneyForm> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "malformed multipart body");
        AppError::Validation("malformed multipart body".into())
    };

    let mut form = NewJourneyForm::default();
    while let Some(field) = mp.next_field().await.map_err(malformed)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => form.title = Some(field.text().await.map_err(malformed)?),
            Some("description") => form.description = Some(field.text().await.map_err(malformed)?),
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let body = field.bytes().await.map_err(malformed)?;
                form.image = Some(ImageUpload { body, content_type });
            }
            _ => {}
        }
    }
    Ok(form)
}
