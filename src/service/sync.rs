// service/sync.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::{Config, SyncProvider},
    error::ErrorMessage,
    models::propertymodel::Property,
    service::error::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub target: String,
    pub pushed: usize,
    pub batches: usize,
}

/// Remote collection the property list can be pushed to and pulled from.
#[async_trait]
pub trait SyncTarget: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends the whole collection. Remote rows are overwritten by id; rows
    /// missing from `properties` are left alone.
    async fn push(&self, properties: &[Property]) -> Result<SyncReport, ServiceError>;

    /// Fetches the remote collection without touching local state.
    async fn pull(&self) -> Result<Vec<Property>, ServiceError>;
}

pub fn build_sync_target(config: &Config) -> Option<Arc<dyn SyncTarget>> {
    match config.sync_provider {
        Some(SyncProvider::Sheets) if !config.sheets_url.is_empty() => {
            Some(Arc::new(SheetsTarget::new(&config.sheets_url)))
        }
        Some(SyncProvider::Supabase)
            if !config.supabase_url.is_empty() && !config.supabase_key.is_empty() =>
        {
            Some(Arc::new(SupabaseTarget::new(
                &config.supabase_url,
                &config.supabase_key,
                &config.supabase_table,
                config.sync_batch_size,
            )))
        }
        Some(ref provider) => {
            tracing::warn!(
                "sync provider {:?} selected but its endpoint is not configured",
                provider
            );
            None
        }
        None => None,
    }
}

/// Decodes a remote collection; anything but a JSON array of properties is a
/// transport failure.
pub fn parse_remote_properties(body: &[u8]) -> Result<Vec<Property>, ServiceError> {
    serde_json::from_slice::<Vec<Property>>(body)
        .map_err(|e| ServiceError::Transport(format!("malformed remote response: {}", e)))
}

/// Spreadsheet web-app endpoint. Push is fire-and-forget: the endpoint has no
/// response contract, so only a failed request counts as an error.
pub struct SheetsTarget {
    client: reqwest::Client,
    url: String,
}

impl SheetsTarget {
    pub fn new(url: &str) -> Self {
        SheetsTarget {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl SyncTarget for SheetsTarget {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn push(&self, properties: &[Property]) -> Result<SyncReport, ServiceError> {
        let payload = serde_json::json!({
            "action": "push",
            "properties": properties,
        });

        self.client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        tracing::info!("pushed {} properties to the spreadsheet", properties.len());
        Ok(SyncReport {
            target: self.name().to_string(),
            pushed: properties.len(),
            batches: 1,
        })
    }

    async fn pull(&self) -> Result<Vec<Property>, ServiceError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("action", "pull")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Transport(format!(
                "spreadsheet answered {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        parse_remote_properties(&body)
    }
}

/// Hosted Postgres table behind a PostgREST API, written with upserts keyed by id.
pub struct SupabaseTarget {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    batch_size: usize,
}

impl SupabaseTarget {
    pub fn new(base_url: &str, api_key: &str, table: &str, batch_size: usize) -> Self {
        SupabaseTarget {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            batch_size: batch_size.max(1),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn upsert_batch(&self, batch: &[Property]) -> Result<(), ServiceError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(batch)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Transport(format!("upsert answered {}: {}", status, body)))
    }
}

#[async_trait]
impl SyncTarget for SupabaseTarget {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn push(&self, properties: &[Property]) -> Result<SyncReport, ServiceError> {
        if properties.is_empty() {
            return Err(ServiceError::Validation(ErrorMessage::NothingToSync.to_string()));
        }

        // No transaction spans the batches; earlier batches stay written on failure.
        let mut pushed = 0;
        let mut batches = 0;
        for batch in properties.chunks(self.batch_size) {
            if let Err(e) = self.upsert_batch(batch).await {
                tracing::error!(
                    "upsert stopped after {} of {} rows: {}",
                    pushed,
                    properties.len(),
                    e
                );
                return Err(ServiceError::Transport(format!(
                    "{} ({} of {} rows were already upserted)",
                    e,
                    pushed,
                    properties.len()
                )));
            }
            pushed += batch.len();
            batches += 1;
        }

        tracing::info!(
            "upserted {} properties into {} in {} batches",
            pushed,
            self.table,
            batches
        );
        Ok(SyncReport {
            target: self.name().to_string(),
            pushed,
            batches,
        })
    }

    async fn pull(&self) -> Result<Vec<Property>, ServiceError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", "contractDate.desc")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Transport(format!("select answered {}: {}", status, body)));
        }

        let body = response.bytes().await?;
        parse_remote_properties(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dtos::propertydtos::fixtures::nkc_input, models::propertymodel::new_property_id,
    };
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use std::{collections::HashMap, sync::Mutex};

    fn properties(n: usize) -> Vec<Property> {
        (0..n)
            .map(|i| {
                nkc_input(&format!("Tenant {}", i)).into_property(new_property_id(), Utc::now())
            })
            .collect()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn builds_nothing_without_endpoint() {
        let mut config = Config::offline("./data");
        assert!(build_sync_target(&config).is_none());

        config.sync_provider = Some(SyncProvider::Supabase);
        config.supabase_url = "https://example.supabase.co".to_string();
        assert!(build_sync_target(&config).is_none());

        config.supabase_key = "anon".to_string();
        assert_eq!(build_sync_target(&config).unwrap().name(), "supabase");

        config.sync_provider = Some(SyncProvider::Sheets);
        config.sheets_url = "https://script.google.com/macros/s/x/exec".to_string();
        assert_eq!(build_sync_target(&config).unwrap().name(), "sheets");
    }

    #[test]
    fn non_array_body_is_a_transport_error() {
        let err = parse_remote_properties(br#"{"error":"quota"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
        assert!(parse_remote_properties(b"[]").unwrap().is_empty());
    }

    #[test]
    fn rows_with_short_legacy_ids_are_accepted() {
        let mut row = serde_json::to_value(&properties(1)[0]).unwrap();
        row["id"] = serde_json::json!("k3j2h1abc");
        let body = serde_json::to_vec(&vec![row]).unwrap();

        let pulled = parse_remote_properties(&body).unwrap();
        assert_eq!(pulled.len(), 1);
        assert_eq!(pulled[0].id, "k3j2h1abc");
    }

    #[tokio::test]
    async fn supabase_push_upserts_in_batches() {
        let seen: Arc<Mutex<Vec<(usize, Option<String>, Option<String>)>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/rest/v1/properties",
            post(
                move |Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      Json(rows): Json<Vec<Property>>| {
                    let recorder = recorder.clone();
                    async move {
                        recorder.lock().unwrap().push((
                            rows.len(),
                            query.get("on_conflict").cloned(),
                            headers
                                .get("prefer")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                        ));
                        StatusCode::CREATED
                    }
                },
            ),
        );
        let base = serve(app).await;

        let target = SupabaseTarget::new(&base, "anon", "properties", 2);
        let report = target.push(&properties(5)).await.unwrap();
        assert_eq!(report.pushed, 5);
        assert_eq!(report.batches, 3);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.iter().map(|s| s.0).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert!(seen.iter().all(|s| s.1.as_deref() == Some("id")));
        assert!(seen
            .iter()
            .all(|s| s.2.as_deref() == Some("resolution=merge-duplicates")));
    }

    #[tokio::test]
    async fn supabase_push_reports_partial_progress() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/rest/v1/properties",
            post(move || {
                let counter = counter.clone();
                async move {
                    let mut calls = counter.lock().unwrap();
                    *calls += 1;
                    if *calls == 1 {
                        StatusCode::CREATED
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }
            }),
        );
        let base = serve(app).await;

        let target = SupabaseTarget::new(&base, "anon", "properties", 2);
        let err = target.push(&properties(4)).await.unwrap_err();
        match err {
            ServiceError::Transport(message) => assert!(message.contains("2 of 4")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn supabase_rejects_empty_push() {
        let target = SupabaseTarget::new("http://127.0.0.1:9", "anon", "properties", 10);
        let err = target.push(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn supabase_pull_orders_by_contract_date() {
        let rows = properties(2);
        let body = rows.clone();
        let app = Router::new().route(
            "/rest/v1/properties",
            get(move |Query(query): Query<HashMap<String, String>>| {
                let body = body.clone();
                async move {
                    if query.get("order").map(String::as_str) == Some("contractDate.desc") {
                        Ok(Json(body))
                    } else {
                        Err(StatusCode::BAD_REQUEST)
                    }
                }
            }),
        );
        let base = serve(app).await;

        let pulled = SupabaseTarget::new(&base, "anon", "properties", 10).pull().await.unwrap();
        assert_eq!(pulled, rows);
    }

    #[tokio::test]
    async fn sheets_push_ignores_response_body() {
        let app = Router::new().route("/exec", post(|| async { "<html>ok</html>" }));
        let base = serve(app).await;

        let report = SheetsTarget::new(&format!("{}/exec", base))
            .push(&properties(3))
            .await
            .unwrap();
        assert_eq!(report.pushed, 3);
        assert_eq!(report.target, "sheets");
    }

    #[tokio::test]
    async fn sheets_pull_rejects_malformed_body() {
        let app = Router::new().route("/exec", get(|| async { "not json" }));
        let base = serve(app).await;

        let err = SheetsTarget::new(&format!("{}/exec", base)).pull().await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let err = SheetsTarget::new("http://127.0.0.1:9/exec")
            .push(&properties(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
