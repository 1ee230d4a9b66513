//! Application state

use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::dispatcher::EventQueue;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Secret for signing access tokens
    pub jwt_secret: String,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Fallback secret for inbound webhook verification
    pub webhook_default_secret: String,
    /// Queue feeding the event dispatcher worker
    pub events: EventQueue,
    /// Process-wide request limiter
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Create the state: connect to Postgres and run migrations
    pub async fn new(
        config: &Config,
        events: EventQueue,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let pool = PgPool::connect(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            refresh_token_ttl_days: config.refresh_token_ttl_days,
            webhook_default_secret: config.webhook_default_secret.clone(),
            events,
            rate_limiter: RateLimiter::new(),
        })
    }
}
