use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{
        extractors::{bearer_token, AuthUser},
        jwt::JwtKeys,
    },
    error::AppError,
};

/// Gate for protected routes. A request without a bearer token is answered
/// with 401 right here and never reaches the handler.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(AppError::Unauthorized);
    };

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(AuthUser(claims.id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::{body::Body, http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(state: AppState, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |AuthUser(id): AuthUser| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        id.to_string()
                    }
                }),
            )
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn request(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        let fake = AppState::fake();
        let hits = Arc::new(AtomicUsize::new(0));
        let res = app(fake.state, hits.clone())
            .oneshot(request(None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "access denied");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let fake = AppState::fake();
        let hits = Arc::new(AtomicUsize::new(0));
        let res = app(fake.state, hits.clone())
            .oneshot(request(Some("Bearer garbage")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["message"], "invalid token");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let fake = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = fake.state.keys.sign_login(user_id).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let res = app(fake.state, hits.clone())
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes, user_id.to_string().as_bytes());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
