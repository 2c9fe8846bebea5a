//! PostgREST-style record source over HTTP.
//!
//! Issues `GET {url}/rest/v1/{table}` with equality, ordering, limit and
//! `ilike` filters encoded as query parameters.

use super::{clean_search_pattern, RecordSource, Row};
use crate::config::{BackendConfig, TableNames};
use crate::error::{ApiError, StoreError};
use crate::level::Level;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub struct RestRecordSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    schema: Option<String>,
    tables: TableNames,
}

impl RestRecordSource {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let base_url = config
            .url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "backend.url is not set (use INFRANAV__BACKEND__URL or --seed)".to_string(),
                )
            })?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            api_key: config.api_key.clone(),
            schema: config.schema.clone(),
            tables: config.tables.clone(),
        })
    }

    fn endpoint(&self, level: Level) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.tables.for_level(level))
    }

    async fn get_rows(
        &self,
        level: Level,
        query: &[(String, String)],
    ) -> Result<Vec<Row>, StoreError> {
        let url = self.endpoint(level);
        debug!(url = %url, ?query, "Backend read");

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }
        if let Some(schema) = &self.schema {
            request = request.header("Accept-Profile", schema);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Backend {
                table: self.tables.for_level(level).to_string(),
                status,
                body,
            });
        }

        Ok(resp.json().await?)
    }
}

pub(crate) fn children_query(parent_field: &str, parent_id: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        (parent_field.to_string(), format!("eq.{}", parent_id)),
        ("order".to_string(), "name.asc".to_string()),
    ]
}

pub(crate) fn all_query() -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "name.asc".to_string()),
    ]
}

pub(crate) fn by_id_query(id: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        ("id".to_string(), format!("eq.{}", id)),
        ("limit".to_string(), "1".to_string()),
    ]
}

pub(crate) fn search_query(pattern: &str, limit: usize) -> Vec<(String, String)> {
    let cleaned = clean_search_pattern(pattern);
    vec![
        ("select".to_string(), "*".to_string()),
        ("name".to_string(), format!("ilike.*{}*", cleaned)),
        ("order".to_string(), "name.asc".to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}

#[async_trait]
impl RecordSource for RestRecordSource {
    async fn list_children(
        &self,
        level: Level,
        parent_field: &str,
        parent_id: &str,
    ) -> Result<Vec<Row>, StoreError> {
        self.get_rows(level, &children_query(parent_field, parent_id))
            .await
    }

    async fn list_all(&self, level: Level) -> Result<Vec<Row>, StoreError> {
        self.get_rows(level, &all_query()).await
    }

    async fn get_by_id(&self, level: Level, id: &str) -> Result<Option<Row>, StoreError> {
        let rows = self.get_rows(level, &by_id_query(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn search_by_name(
        &self,
        level: Level,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Row>, StoreError> {
        self.get_rows(level, &search_query(pattern, limit)).await
    }
}
