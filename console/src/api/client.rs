use civreg_lifecycle::{
    AcknowledgePayload, CreateServiceRequest, OverridePayload, RequestFilter, RequestKind,
    RequestPage, RequestStats, ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use uuid::Uuid;

use super::types::{ApiError, HistoryResponse};
use crate::config::{ActorIdentity, ConsoleConfig};

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_NAME_HEADER: &str = "x-actor-name";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Lenient view of an error body; anything missing falls back to
/// "Unknown error".
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    actor: Option<ActorIdentity>,
}

impl ApiClient {
    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            actor: None,
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        let client = Self::new_with_base_url(config.api_base_url.clone());
        match &config.actor {
            Some(actor) => client.with_actor(actor.clone()),
            None => client,
        }
    }

    pub fn with_actor(mut self, actor: ActorIdentity) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(actor) = &self.actor {
            builder = builder
                .header(ACTOR_ID_HEADER, actor.id.as_str())
                .header(ACTOR_ROLE_HEADER, actor.role.as_str());
            if let Some(name) = &actor.name {
                builder = builder.header(ACTOR_NAME_HEADER, name.as_str());
            }
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))?;
        Self::map_json_response(response).await
    }

    async fn map_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)));
        }

        let bytes = response.bytes().await.unwrap_or_default();
        let error = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(ErrorBody {
                error: Some(error),
                code,
                details,
            }) if !error.trim().is_empty() => ApiError {
                error,
                code: code.unwrap_or_else(|| "UNKNOWN".to_string()),
                details,
            },
            _ => ApiError::unknown("Unknown error"),
        };
        log::debug!("registry API answered {}: {}", status, error.error);
        Err(error)
    }

    fn request_path(kind: RequestKind, id: Uuid, suffix: &str) -> String {
        format!("/api/{}/{}{}", kind.slug(), id, suffix)
    }

    pub async fn list_requests(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: u32,
        per_page: u32,
    ) -> Result<RequestPage, ApiError> {
        let mut params = filter.query_pairs();
        params.push(("page", page.to_string()));
        params.push(("per_page", per_page.to_string()));
        let builder = self
            .request(Method::GET, &format!("/api/{}", kind.slug()))
            .query(&params);
        self.send(builder).await
    }

    pub async fn request_stats(&self, kind: RequestKind) -> Result<RequestStats, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/{}/stats", kind.slug())))
            .await
    }

    pub async fn get_request(&self, kind: RequestKind, id: Uuid) -> Result<ServiceRequest, ApiError> {
        self.send(self.request(Method::GET, &Self::request_path(kind, id, "")))
            .await
    }

    pub async fn create_request(
        &self,
        kind: RequestKind,
        payload: &CreateServiceRequest,
    ) -> Result<ServiceRequest, ApiError> {
        let builder = self
            .request(Method::POST, &format!("/api/{}", kind.slug()))
            .json(payload);
        self.send(builder).await
    }

    pub async fn update_status(
        &self,
        kind: RequestKind,
        id: Uuid,
        update: &StatusUpdate,
    ) -> Result<ServiceRequest, ApiError> {
        let builder = self
            .request(Method::PATCH, &Self::request_path(kind, id, "/status"))
            .json(update);
        self.send(builder).await
    }

    pub async fn acknowledge(
        &self,
        kind: RequestKind,
        id: Uuid,
        payload: &AcknowledgePayload,
    ) -> Result<ServiceRequest, ApiError> {
        let builder = self
            .request(Method::POST, &Self::request_path(kind, id, "/acknowledge"))
            .json(payload);
        self.send(builder).await
    }

    pub async fn override_request(
        &self,
        kind: RequestKind,
        id: Uuid,
        payload: &OverridePayload,
    ) -> Result<ServiceRequest, ApiError> {
        let builder = self
            .request(Method::POST, &Self::request_path(kind, id, "/override"))
            .json(payload);
        self.send(builder).await
    }

    pub async fn request_history(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, ApiError> {
        let response: HistoryResponse = self
            .send(self.request(Method::GET, &Self::request_path(kind, id, "/history")))
            .await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_path_uses_resource_slug() {
        let id = Uuid::nil();
        assert_eq!(
            ApiClient::request_path(RequestKind::BurialPermit, id, "/status"),
            format!("/api/burial-permits/{}/status", id)
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new_with_base_url("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn from_config_carries_the_actor() {
        let config = ConsoleConfig {
            api_base_url: "http://registry.local".into(),
            actor: Some(ActorIdentity::new("clerk-1", "staff")),
        };
        let client = ApiClient::from_config(&config);
        assert_eq!(client.actor.as_ref().map(|a| a.id.as_str()), Some("clerk-1"));
    }
}
