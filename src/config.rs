use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of tokens handed out at registration.
    pub register_ttl_minutes: i64,
    pub login_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// HTTP mail API endpoint. `None` means mails are only logged.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Public base URL prepended to stored image keys.
    pub img_url: String,
    pub reset_link_base_url: String,
    pub reset_link_ttl_minutes: i64,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.into());
        let minutes = |key: &str, default: i64| -> anyhow::Result<i64> {
            match var(key) {
                Some(v) => {
                    let parsed = v
                        .parse::<i64>()
                        .with_context(|| format!("{key} must be a number of minutes"))?;
                    anyhow::ensure!(parsed > 0, "{key} must be positive");
                    Ok(parsed)
                }
                None => Ok(default),
            }
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: or("JWT_ISSUER", "wayfarer"),
            audience: or("JWT_AUDIENCE", "wayfarer-users"),
            register_ttl_minutes: minutes("JWT_REGISTER_TTL_MINUTES", 60 * 24)?,
            login_ttl_minutes: minutes("JWT_LOGIN_TTL_MINUTES", 60 * 24)?,
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");

        let mail = MailConfig {
            api_url: var("MAIL_API_URL").filter(|v| !v.is_empty()),
            api_key: var("MAIL_API_KEY").filter(|v| !v.is_empty()),
            from: or("MAIL_FROM", "no-reply@wayfarer.local"),
        };

        let storage = StorageConfig {
            endpoint: or("MINIO_ENDPOINT", "http://localhost:9000"),
            bucket: or("MINIO_BUCKET", "wayfarer"),
            access_key: or("MINIO_ACCESS_KEY", "minioadmin"),
            secret_key: or("MINIO_SECRET_KEY", "minioadmin"),
            region: or("MINIO_REGION", "us-east-1"),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt,
            img_url: or("IMG_URL", "http://localhost:5000/uploads/"),
            reset_link_base_url: or("RESET_LINK_BASE_URL", "http://localhost:3000/reset-password"),
            reset_link_ttl_minutes: minutes("RESET_LINK_TTL_MINUTES", 60)?,
            mail,
            storage,
        })
    }

    /// Public URL for an object stored under `key`.
    pub fn image_url(&self, key: &str) -> String {
        format!("{}{}", self.img_url, key)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/{}", self.reset_link_base_url.trim_end_matches('/'), token)
    }
}
