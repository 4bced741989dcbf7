use std::sync::Arc;

use axum::extract::FromRef;
use rand::{distributions::Alphanumeric, Rng};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{CurrentUser, LoggedInUser, LoginRequest, RegisterRequest, RegisteredUser},
        jwt::JwtKeys,
        password::{hash_password, verify_dummy, verify_password},
        repo::UserStore,
        repo_types::NewUser,
        validation::{self, normalize_email},
    },
    config::AppConfig,
    error::{AppError, AppResult},
    mail::Mailer,
    state::AppState,
};

const RESET_TOKEN_LEN: usize = 48;
const DEFAULT_PROFILE_IMAGE: &str = "profile.png";

/// Register / login / password-reset orchestration over the user store,
/// token keys and mailer.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    mailer: Arc<dyn Mailer>,
    config: Arc<AppConfig>,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            keys: state.keys.clone(),
            mailer: state.mailer.clone(),
            config: state.config.clone(),
        }
    }
}

/// Argon2 work runs on the blocking pool.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

pub(crate) fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

impl AuthService {
    pub async fn register(&self, req: RegisterRequest) -> AppResult<RegisteredUser> {
        let email = req.email.as_deref().map(normalize_email);
        let fullname = validation::min_len("fullname", req.fullname.as_deref(), 6)?.to_string();
        let email = validation::email(email.as_deref())?.to_string();
        let password = validation::password(req.password.as_deref())?.to_string();

        // Fast path only; the unique constraint in `create` is authoritative.
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("register with existing email");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = blocking(move || hash_password(&password)).await??;

        let user = self
            .users
            .create(NewUser {
                fullname,
                email,
                password_hash,
                phone: req.phone,
                address: req.address,
                image: self.config.image_url(DEFAULT_PROFILE_IMAGE),
            })
            .await?;

        let token = self.keys.sign_register(user.id)?;

        info!(user_id = %user.id, "user registered");
        Ok(RegisteredUser {
            fullname: user.fullname,
            email: user.email,
            token,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<LoggedInUser> {
        let email = req.email.as_deref().map(normalize_email);
        let email = validation::email(email.as_deref())?;
        let password = validation::password(req.password.as_deref())?.to_string();

        let Some(user) = self.users.find_by_email(email).await? else {
            blocking(move || verify_dummy(&password)).await?;
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let stored = user.password_hash.clone();
        match blocking(move || verify_password(&password, &stored)).await? {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %user.id, "login invalid password");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, user_id = %user.id, "stored password hash unreadable");
                return Err(AppError::InvalidCredentials);
            }
        }

        let token = self.keys.sign_login(user.id)?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoggedInUser {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            token,
        })
    }

    pub async fn check_auth(&self, user_id: Uuid) -> AppResult<CurrentUser> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("user"))?;
        Ok(CurrentUser {
            id: user.id,
            name: user.fullname,
            email: user.email,
        })
    }

    /// Stores a fresh reset token and mails the link. Unknown emails yield
    /// `EmailNotRegistered`; callers decide whether to reveal that.
    pub async fn forgot_password(&self, email: Option<&str>) -> AppResult<()> {
        let email = normalize_email(validation::required("email", email)?);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::EmailNotRegistered)?;

        let token = generate_reset_token();
        let expires_at = OffsetDateTime::now_utc()
            + TimeDuration::minutes(self.config.reset_link_ttl_minutes);
        self.users
            .update_reset_link(user.id, &token, expires_at)
            .await?;

        let body = format!(
            "To reset your password, please click on this link: {}",
            self.config.reset_link(&token)
        );
        self.mailer
            .send(&user.email, "Reset Password Instructions", &body)
            .await
            .map_err(AppError::MailDispatch)?;

        info!(user_id = %user.id, "reset link sent");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: Option<&str>) -> AppResult<()> {
        let password = validation::password(new_password)?.to_string();
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredResetToken);
        }

        let password_hash = blocking(move || hash_password(&password)).await??;

        let user_id = self
            .users
            .update_password_by_reset_link(token, &password_hash, OffsetDateTime::now_utc())
            .await?
            .ok_or(AppError::InvalidOrExpiredResetToken)?;

        info!(user_id = %user_id, "password reset");
        Ok(())
    }
}
