use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{
    DailyPracticePlan, QuestSubmitRequest, QuestSubmitResult, QuestSummary,
    WorldProgressResponse,
};
use crate::config::ApiConfig;

/// Typed client for the arcade REST API.
#[derive(Debug, Clone)]
pub struct ArcadeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ArcadeClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(ApiError::Config("api baseUrl cannot be empty".to_string()));
        }
        reqwest::Url::parse(base_url).map_err(|error| {
            ApiError::Config(format!("invalid api baseUrl '{base_url}': {error}"))
        })?;
        if config.timeout_ms == 0 {
            return Err(ApiError::Config(
                "api timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|error| ApiError::Config(error.to_string()))?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_world_progress(&self) -> Result<WorldProgressResponse, ApiError> {
        self.get_json("/api/worlds/progress").await
    }

    pub async fn fetch_quests(&self, world_id: Option<&str>) -> Result<Vec<QuestSummary>, ApiError> {
        let path = match world_id {
            Some(world_id) => format!("/api/quests/?world_id={}", urlencoding::encode(world_id)),
            None => "/api/quests/".to_string(),
        };
        self.get_json(&path).await
    }

    pub async fn accept_quest(&self, slug: &str) -> Result<QuestSummary, ApiError> {
        let path = format!("/api/quests/{}/accept", urlencoding::encode(slug));
        self.post_json::<(), _>(&path, None).await
    }

    pub async fn submit_quest(
        &self,
        slug: &str,
        request: &QuestSubmitRequest,
    ) -> Result<QuestSubmitResult, ApiError> {
        if request.code.trim().is_empty() {
            return Err(ApiError::Validation(
                "submission code cannot be empty".to_string(),
            ));
        }
        let path = format!("/api/quests/{}/submit", urlencoding::encode(slug));
        self.post_json(&path, Some(request)).await
    }

    pub async fn fetch_practice_today(&self) -> Result<DailyPracticePlan, ApiError> {
        self.get_json("/api/practice_rounds/today").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|error| self.transport_error(&endpoint, error))?;
        read_json(&endpoint, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let endpoint = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|error| self.transport_error(&endpoint, error))?;
        read_json(&endpoint, response).await
    }

    fn transport_error(&self, endpoint: &str, error: reqwest::Error) -> ApiError {
        if error.is_connect() {
            return ApiError::Request(format!(
                "could not reach arcade API at {}: {error}",
                self.base_url
            ));
        }
        tracing::debug!("request to {endpoint} failed: {error}");
        ApiError::from(error)
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    tracing::debug!("arcade API response: endpoint={endpoint} status={status}");

    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            detail: error_detail(&text, status),
        });
    }

    serde_json::from_str(&text)
        .map_err(|error| ApiError::InvalidResponse(format!("{endpoint} parse failed: {error}")))
}

/// FastAPI-style `{"detail": ...}` bodies carry the useful message.
fn error_detail(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_detail_field() {
        let status = reqwest::StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(
            error_detail(r#"{"detail":"code is required"}"#, status),
            "code is required"
        );
        assert_eq!(
            error_detail(r#"{"detail":[{"loc":["body","code"]}]}"#, status),
            r#"[{"loc":["body","code"]}]"#
        );
    }

    #[test]
    fn error_detail_falls_back_to_body_then_reason() {
        let status = reqwest::StatusCode::BAD_GATEWAY;
        assert_eq!(error_detail("upstream down\n", status), "upstream down");
        assert_eq!(error_detail("", status), "Bad Gateway");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            timeout_ms: 1_000,
        };
        assert!(matches!(ArcadeClient::new(&config), Err(ApiError::Config(_))));

        let config = ApiConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 0,
        };
        assert!(matches!(ArcadeClient::new(&config), Err(ApiError::Config(_))));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:8000/".to_string(),
            timeout_ms: 1_000,
        };
        let client = ArcadeClient::new(&config).expect("client should build");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }
}
