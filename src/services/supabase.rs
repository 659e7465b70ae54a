use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::core::collaborators::ClinicInfoStore;
use crate::core::errors::{MatchError, StoreError};
use crate::core::ranking::rank_by_similarity;
use crate::models::{ClinicInfo, ServiceMatch};

/// Table and function names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    /// Single-row table holding the clinic record
    pub clinic_info: String,
    /// Postgres function doing the vector similarity search
    pub match_function: String,
    /// Table the similarity search reads from
    pub services: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            clinic_info: "clinic_info".to_string(),
            match_function: "match_services".to_string(),
            services: "services".to_string(),
        }
    }
}

/// Supabase (PostgREST) client
///
/// Reads the clinic record, runs the service similarity search RPC and
/// inserts embedded service documents.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    tables: SupabaseTables,
    client: Client,
}

#[derive(Serialize)]
struct MatchServicesParams<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

#[derive(Serialize)]
struct NewService<'a> {
    content: &'a str,
    embedding: &'a [f32],
}

impl SupabaseClient {
    pub fn new(base_url: String, api_key: String, tables: SupabaseTables) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            tables,
            client,
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Fetch the first row of the clinic table, or the placeholder record when it is empty
    pub async fn get_clinic_info(&self) -> Result<ClinicInfo, StoreError> {
        let url = format!(
            "{}?select=*&limit=1",
            self.rest_url(&urlencoding::encode(&self.tables.clinic_info))
        );

        tracing::debug!("Fetching clinic info from table {}", self.tables.clinic_info);

        let response = self.authorized(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(StoreError::ApiError { status, body });
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Expected an array of rows: {}", e)))?;

        let Some(row) = rows.into_iter().next() else {
            tracing::warn!("Clinic table {} is empty, using placeholder record", self.tables.clinic_info);
            return Ok(ClinicInfo::placeholder());
        };

        serde_json::from_value(row)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse clinic info: {}", e)))
    }

    /// Call the similarity search function for `embedding`
    ///
    /// Rows are returned sorted by descending similarity and capped at `match_count`.
    /// Rows that do not parse as services are skipped.
    pub async fn match_services(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<ServiceMatch>, MatchError> {
        let url = self.rest_url(&format!("rpc/{}", urlencoding::encode(&self.tables.match_function)));

        let params = MatchServicesParams {
            query_embedding: embedding,
            match_count,
        };

        let response = self.authorized(self.client.post(&url)).json(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(MatchError::SearchApi { status, body });
        }

        let json: Value = response.json().await?;

        // PostgREST answers `null` for a set-returning function with no rows in some setups
        let rows = match json {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => {
                return Err(MatchError::InvalidResponse(format!(
                    "Expected an array of services, got {}",
                    other
                )))
            }
        };

        let total = rows.len();
        let mut services: Vec<ServiceMatch> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!("Skipping malformed service row: {}", e);
                    None
                }
            })
            .collect();

        rank_by_similarity(&mut services);
        services.truncate(match_count);

        tracing::debug!("Similarity search returned {} services ({} rows)", services.len(), total);

        Ok(services)
    }

    /// Insert one service document with its embedding into the services table
    pub async fn insert_service(&self, content: &str, embedding: &[f32]) -> Result<(), StoreError> {
        let url = self.rest_url(&urlencoding::encode(&self.tables.services));

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(&NewService { content, embedding })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(StoreError::ApiError { status, body });
        }

        tracing::debug!("Inserted service document into {}", self.tables.services);

        Ok(())
    }
}

#[async_trait]
impl ClinicInfoStore for SupabaseClient {
    async fn fetch_clinic_info(&self) -> Result<ClinicInfo, StoreError> {
        self.get_clinic_info().await
    }
}
