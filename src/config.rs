//! Runtime configuration loaded from environment variables.
//!
//! - `STACKTRACK_DB` - Database file (default: platform data dir)
//! - `STACKTRACK_PORT` - Port for the HTTP API (default: `3000`)
//! - `STACKTRACK_URL` - Base URL the CLI talks to (default: `http://127.0.0.1:3000/api/v1`)
//! - `STACKTRACK_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;

use anyhow::Result;

use crate::db::{self, Database};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct Config {
    /// Explicit database location; `None` uses [`db::default_path`].
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub server_url: String,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("STACKTRACK_DB")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let port = lookup("STACKTRACK_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let server_url = lookup("STACKTRACK_URL")
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/v1", port));

        let cors_origins = lookup("STACKTRACK_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        Self {
            db_path,
            port,
            server_url,
            cors_origins,
        }
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> Result<Database> {
        let path = match &self.db_path {
            Some(path) => path.clone(),
            None => db::default_path()?,
        };
        let db = Database::open(path)?;
        db.migrate()?;
        Ok(db)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
