use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub angles_file: PathBuf,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "angletrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "angletrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        if jwt.secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            users_file: std::env::var("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/users.json")),
            angles_file: std::env::var("ANGLES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/angleData.json")),
            uploads_dir: std::env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20 * 1024 * 1024),
            jwt,
        })
    }
}
