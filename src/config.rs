use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Oversell policy: when true, stock mutations that would go below zero
    /// are rejected instead of recording negative stock.
    pub clamp_stock_at_zero: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let clamp_stock_at_zero = env::var("INVENTORY_CLAMP_ZERO")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        Ok(Self {
            port,
            database_url,
            host,
            clamp_stock_at_zero,
        })
    }
}
