use civreg_lifecycle::{
    AcknowledgePayload, OverridePayload, RequestFilter, RequestKind, RequestStats,
    ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ApiClient, ApiError};

/// Largest page the registry serves.
pub const BOARD_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct RequestsRepository {
    client: Arc<ApiClient>,
}

impl RequestsRepository {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: Arc::new(api),
        }
    }

    /// Every request matching `filter`, fetched page by page until the
    /// registry's total is reached.
    pub async fn load_board(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
    ) -> Result<Vec<ServiceRequest>, ApiError> {
        let mut requests = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .client
                .list_requests(kind, filter, page, BOARD_PAGE_SIZE)
                .await?;
            let fetched = batch.data.len();
            requests.extend(batch.data);
            if fetched == 0 || requests.len() as i64 >= batch.total {
                break;
            }
            log::debug!(
                "{} board page {} loaded, {} of {}",
                kind,
                page,
                requests.len(),
                batch.total
            );
            page += 1;
        }
        Ok(requests)
    }

    pub async fn load_stats(&self, kind: RequestKind) -> Result<RequestStats, ApiError> {
        self.client.request_stats(kind).await
    }

    pub async fn change_status(
        &self,
        kind: RequestKind,
        id: Uuid,
        update: &StatusUpdate,
    ) -> Result<ServiceRequest, ApiError> {
        self.client.update_status(kind, id, update).await
    }

    pub async fn acknowledge(
        &self,
        kind: RequestKind,
        id: Uuid,
        payload: &AcknowledgePayload,
    ) -> Result<ServiceRequest, ApiError> {
        self.client.acknowledge(kind, id, payload).await
    }

    pub async fn apply_override(
        &self,
        kind: RequestKind,
        id: Uuid,
        payload: &OverridePayload,
    ) -> Result<ServiceRequest, ApiError> {
        self.client.override_request(kind, id, payload).await
    }

    pub async fn load_history(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, ApiError> {
        self.client.request_history(kind, id).await
    }
}
