use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "momentum".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "momentum-users".into()),
            ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                // zero or negative lifetimes would wrap when cast to u64
                .filter(|&v| v > 0)
                .unwrap_or(3600),
        };
        Ok(Self { database_url, jwt })
    }
}
