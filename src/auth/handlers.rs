use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            CurrentUser, ForgotPasswordRequest, LoggedInUser, LoginRequest, RegisterRequest,
            RegisteredUser, ResetPasswordRequest, UserEnvelope,
        },
        extractors::AuthUser,
        middleware::require_auth,
        services::AuthService,
    },
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    response::Success,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", post(reset_password))
}

pub fn me_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/check-auth", get(check_auth))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Json<Success<UserEnvelope<RegisteredUser>>>> {
    let user = auth.register(payload).await?;
    Ok(Json(Success::with(UserEnvelope { user })))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<Success<UserEnvelope<LoggedInUser>>>> {
    let user = auth.login(payload).await?;
    Ok(Json(Success::with(UserEnvelope { user })))
}

#[instrument(skip(auth))]
pub async fn check_auth(
    State(auth): State<AuthService>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Success<UserEnvelope<CurrentUser>>>> {
    let user = auth.check_auth(user_id).await?;
    Ok(Json(Success::with(UserEnvelope { user })))
}

/// Answers the same way whether or not the email is registered.
#[instrument(skip(auth, payload))]
pub async fn forgot_password(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<Success<()>>> {
    match auth.forgot_password(payload.email.as_deref()).await {
        Ok(()) => {}
        Err(AppError::EmailNotRegistered) => info!("reset requested for unknown email"),
        Err(e) => return Err(e),
    }
    Ok(Json(Success::empty()))
}

#[instrument(skip(auth, token, payload))]
pub async fn reset_password(
    State(auth): State<AuthService>,
    AppPath(token): AppPath<String>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<Success<()>>> {
    auth.reset_password(&token, payload.password.as_deref()).await?;
    Ok(Json(Success::empty()))
}
