use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn load() -> Result<Config> {
    Ok(Config {
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
        },
        server: ServerConfig {
            host: std::env::var("HOST").unwrap_or("0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
        },
    })
}

/// Token signing secret. The default only exists so local development works
/// without a .env file.
pub fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or("wdland-dev-secret-change-me".to_string())
}
