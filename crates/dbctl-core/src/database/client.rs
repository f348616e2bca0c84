//! HTTP client for the database control-plane API
//!
//! The client is a stateless facade: each method is exactly one request, with
//! no retry and no caching. Errors are returned unmodified so the caller can
//! decide (the CLI treats every one of them as fatal).

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::models::{ApiErrorBody, Database, LifecycleState};
use super::params::CreationSpec;
use crate::config::ConnectionSettings;
use crate::error::{CoreError, Result};

/// User agent string for dbctl HTTP requests
const DBCTL_USER_AGENT: &str = concat!("dbctl/", env!("CARGO_PKG_VERSION"));

/// API version path segment
const API_VERSION: &str = "20160918";

/// The two remote operations the provisioning workflow needs
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// Submit a creation request and return the new resource
    async fn create(&self, spec: &CreationSpec) -> Result<Database>;

    /// Fetch the current lifecycle state of a resource
    async fn get_status(&self, database_id: &str) -> Result<LifecycleState>;
}

/// reqwest-backed implementation of [`DatabaseApi`]
#[derive(Debug, Clone)]
pub struct DatabaseClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: SecretString,
}

impl DatabaseClient {
    /// Build a client from resolved connection settings
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.endpoint).map_err(|e| {
            CoreError::Validation(format!("invalid endpoint '{}': {}", settings.endpoint, e))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(DBCTL_USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth_token: settings.auth_token.clone(),
        })
    }

    /// Fetch the full database description
    pub async fn get(&self, database_id: &str) -> Result<Database> {
        let url = self.url(&["databases", database_id])?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(self.auth_token.expose_secret())
            .send()
            .await?;

        handle_response(response).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CoreError::Validation(format!(
                    "endpoint '{}' cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl DatabaseApi for DatabaseClient {
    async fn create(&self, spec: &CreationSpec) -> Result<Database> {
        let url = self.url(&["databases"])?;
        debug!(
            "POST {} (db_name={}, db_home_id={}, workload={})",
            url, spec.name, spec.home_id, spec.workload_type
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(&spec.to_request())
            .send()
            .await?;

        handle_response(response).await
    }

    async fn get_status(&self, database_id: &str) -> Result<LifecycleState> {
        let database = self.get(database_id).await?;
        database.lifecycle_state.ok_or_else(|| {
            CoreError::InvalidResponse(format!(
                "database {} has no lifecycleState",
                database_id
            ))
        })
    }
}

/// Decode a success body or turn the response into [`CoreError::Api`]
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    trace!("Response status: {}", status);

    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body)
            .map_err(|e| CoreError::InvalidResponse(format!("failed to decode body: {}", e)));
    }

    let request_id = response
        .headers()
        .get("opc-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = response.text().await.unwrap_or_default();

    Err(CoreError::Api {
        status: status.as_u16(),
        message: error_message(status, &body, request_id.as_deref()),
    })
}

fn error_message(status: StatusCode, body: &str, request_id: Option<&str>) -> String {
    let mut message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(msg),
        }) => format!("{}: {}", code, msg),
        Ok(ApiErrorBody {
            message: Some(msg), ..
        }) => msg,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    if let Some(id) = request_id {
        message.push_str(&format!(" [opc-request-id: {}]", id));
    }
    message
}
