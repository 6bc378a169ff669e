// config.rs
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_LOCAL_STORE_DIR: &str = "./data";
pub const DEFAULT_SUPABASE_TABLE: &str = "properties";
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncProvider {
    Sheets,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Relational backend. `None` runs the service on the offline property file.
    pub database_url: Option<String>,
    pub port: u16,
    pub max_connections: u32,
    pub local_store_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    // Sync bridge
    pub sync_provider: Option<SyncProvider>,
    pub sheets_url: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub supabase_table: String,
    pub sync_batch_size: usize,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let port = parse_or_default("PORT", DEFAULT_PORT);
        let max_connections = parse_or_default("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let sync_batch_size = parse_or_default("SYNC_BATCH_SIZE", DEFAULT_SYNC_BATCH_SIZE).max(1);

        let local_store_dir = std::env::var("LOCAL_STORE_DIR")
            .unwrap_or_else(|_| DEFAULT_LOCAL_STORE_DIR.to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let sync_provider = match std::env::var("SYNC_PROVIDER").unwrap_or_default().trim() {
            "sheets" => Some(SyncProvider::Sheets),
            "supabase" => Some(SyncProvider::Supabase),
            _ => None,
        };

        let sheets_url = std::env::var("SHEETS_URL").unwrap_or_default();
        let supabase_url = std::env::var("SUPABASE_URL").unwrap_or_default();
        let supabase_key = std::env::var("SUPABASE_KEY").unwrap_or_default();
        let supabase_table = std::env::var("SUPABASE_TABLE")
            .unwrap_or_else(|_| DEFAULT_SUPABASE_TABLE.to_string());

        Config {
            database_url,
            port,
            max_connections,
            local_store_dir: PathBuf::from(local_store_dir),
            allowed_origins,
            sync_provider,
            sheets_url,
            supabase_url,
            supabase_key,
            supabase_table,
            sync_batch_size,
        }
    }

    /// Offline configuration rooted at `dir`, used when no environment is available.
    pub fn offline(dir: impl Into<PathBuf>) -> Config {
        Config {
            database_url: None,
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            local_store_dir: dir.into(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            sync_provider: None,
            sheets_url: String::new(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            supabase_table: DEFAULT_SUPABASE_TABLE.to_string(),
            sync_batch_size: DEFAULT_SYNC_BATCH_SIZE,
        }
    }
}

fn parse_or_default<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("{} has an invalid value {:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
