use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{auth::claims::Claims, config::JwtConfig, state::AppState};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),
}

/// Signing and verification keys, built once from config at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub register_ttl: Duration,
    pub login_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            register_ttl: Duration::from_secs((config.register_ttl_minutes as u64) * 60),
            login_ttl: Duration::from_secs((config.login_ttl_minutes as u64) * 60),
        }
    }

    /// Signs `{id}` for `user_id`. Without a ttl the token carries no `exp`.
    pub fn issue(&self, user_id: Uuid, ttl: Option<Duration>) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            id: user_id,
            iat: now,
            exp: ttl.map(|ttl| now + ttl.as_secs() as usize),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token =
            encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(TokenError::Sign)?;
        debug!(user_id = %user_id, ttl_secs = ?ttl.map(|t| t.as_secs()), "jwt signed");
        Ok(token)
    }

    pub fn sign_register(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, Some(self.register_ttl))
    }

    pub fn sign_login(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, Some(self.login_ttl))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Only HS256 is accepted; a token whose header names another
        // algorithm is rejected before the signature is checked.
        let mut validation = Validation::new(ALGORITHM);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, issuer: &str, audience: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            register_ttl_minutes: 60 * 24,
            login_ttl_minutes: 60,
        }
    }

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&config(secret, "test-issuer", "test-aud"))
    }

    fn sign_raw(claims: &Claims, alg: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn register_token_round_trips_and_expires_within_a_day() {
        let keys = make_keys("dev-secret");
        let user_id = Uuid::new_v4();
        let token = keys.sign_register(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        let exp = claims.exp.expect("register tokens expire");
        assert!(exp > claims.iat);
        assert!(exp - claims.iat <= 24 * 60 * 60);
    }

    #[test]
    fn token_without_ttl_has_no_exp_and_still_verifies() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(Uuid::new_v4(), None).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert!(claims.exp.is_none());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            id: Uuid::new_v4(),
            iat: now - 7200,
            exp: Some(now - 3600),
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let token = sign_raw(&claims, Algorithm::HS256, "dev-secret");
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let token = make_keys("secret-a").sign_login(Uuid::new_v4()).unwrap();
        assert!(matches!(
            make_keys("secret-b").verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_token_with_other_algorithm() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            id: Uuid::new_v4(),
            iat: now,
            exp: Some(now + 600),
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let token = sign_raw(&claims, Algorithm::HS512, "dev-secret");
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_wrong_issuer_or_audience() {
        let good = JwtKeys::new(&config("same-secret", "good-iss", "good-aud"));
        let bad = JwtKeys::new(&config("same-secret", "bad-iss", "bad-aud"));
        let token = good.sign_login(Uuid::new_v4()).unwrap();
        assert!(matches!(bad.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(matches!(keys.verify("not.a.jwt"), Err(TokenError::Invalid(_))));
        assert!(matches!(keys.verify(""), Err(TokenError::Invalid(_))));
    }
}
