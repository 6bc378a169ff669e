mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use chrono::{DateTime, Utc};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    db::{db::DBClient, localstore::LocalStore, propertydb::PropertyExt},
    error::{ErrorMessage, HttpError},
    service::sync::{build_sync_target, SyncTarget},
};

/// Outcome of the last successful push or pull.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSync {
    pub direction: &'static str,
    pub count: usize,
    pub at: DateTime<Utc>,
}

pub struct AppState {
    pub env: Config,
    /// Property store: the database when configured, the offline file otherwise.
    pub properties: Arc<dyn PropertyExt>,
    pub db_client: Option<Arc<DBClient>>,
    pub sync_target: Option<Arc<dyn SyncTarget>>,
    pub last_sync: RwLock<Option<LastSync>>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client = Arc::new(db_client);
        let sync_target = build_sync_target(&config);

        AppState {
            env: config,
            properties: db_client.clone(),
            db_client: Some(db_client),
            sync_target,
            last_sync: RwLock::new(None),
        }
    }

    pub fn offline(config: Config) -> Self {
        let store = LocalStore::open(&config.local_store_dir);
        let sync_target = build_sync_target(&config);

        AppState {
            env: config,
            properties: Arc::new(store),
            db_client: None,
            sync_target,
            last_sync: RwLock::new(None),
        }
    }

    /// Payments, maintenance and activity live only in the database.
    pub fn db(&self) -> Result<&Arc<DBClient>, HttpError> {
        self.db_client
            .as_ref()
            .ok_or_else(|| HttpError::unavailable(ErrorMessage::BackendNotConfigured.to_string()))
    }
}

async fn connect(config: &Config, database_url: &str) -> Option<DBClient> {
    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!(
                "connected to the database (max {} connections)",
                config.max_connections
            );
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            return None;
        }
    };

    let db_client = DBClient::new(pool);
    if let Err(err) = db_client.migrate().await {
        tracing::error!("failed to run migrations: {:?}", err);
        return None;
    }
    Some(db_client)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH])
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let app_state = match config.database_url.clone() {
        Some(database_url) => match connect(&config, &database_url).await {
            Some(db_client) => AppState::new(db_client, config.clone()),
            None => std::process::exit(1),
        },
        None => {
            tracing::warn!(
                "DATABASE_URL not set; serving properties from {}",
                config.local_store_dir.display()
            );
            AppState::offline(config.clone())
        }
    };

    match &app_state.sync_target {
        Some(target) => tracing::info!("sync provider: {}", target.name()),
        None => tracing::info!("sync disabled"),
    }

    let app = create_router(Arc::new(app_state)).layer(cors_layer(&config));

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("cannot bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", err);
    }
}
