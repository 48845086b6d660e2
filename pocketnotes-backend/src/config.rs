use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATA_DIR: &str = "DATA_DIR";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Directory holding the built web client, served with an SPA fallback
    pub const FRONTEND_DIST: &str = "FRONTEND_DIST";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATA_DIR: &str = ".data";
    pub const NOTES_FILE: &str = "notes.json";
    pub const DATABASE_FILE: &str = "pocketnotes.db";
    pub const FRONTEND_DIST: &str = "frontend/dist";
}

/// Returns the absolute path to the pocketnotes-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it always resolves to the
/// crate directory regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Get the data directory (notes store + database live here)
pub fn data_dir() -> PathBuf {
    match env::var(env_vars::DATA_DIR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => backend_dir().join(defaults::DATA_DIR),
    }
}

/// Path of the JSON document holding the serialized notes collection
pub fn notes_store_path() -> PathBuf {
    data_dir().join(defaults::NOTES_FILE)
}

/// Get the frontend dist directory for static serving
pub fn frontend_dist_dir() -> PathBuf {
    match env::var(env_vars::FRONTEND_DIST) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => backend_dir().join(defaults::FRONTEND_DIST),
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL).unwrap_or_else(|_| {
                data_dir()
                    .join(defaults::DATABASE_FILE)
                    .to_string_lossy()
                    .to_string()
            }),
        }
    }
}

/// Initialize the data directory.
/// This should be called at startup before the store or database is opened.
pub fn initialize_data_dir() -> std::io::Result<()> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    log::info!("Data directory: {:?}", dir);
    Ok(())
}
