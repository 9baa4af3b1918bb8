use civreg_lifecycle::{
    available_actions, lifecycle_for, plan_override, AcknowledgePayload, ActionInput,
    OverridePayload, OverrideSnapshot, RequestFilter, RequestKind, RequestStats,
    ServiceRequest, StaffAction, StatusBadge, StatusHistoryEntry, StatusUpdate,
};
use uuid::Uuid;

use super::repository::RequestsRepository;
use super::utils::MessageState;
use crate::api::ApiError;

/// One line of the request board.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRow {
    pub request: ServiceRequest,
    pub badge: StatusBadge,
    pub actions: Vec<StaffAction>,
}

impl RequestRow {
    fn from_request(request: &ServiceRequest) -> Self {
        Self {
            badge: request.badge(),
            actions: available_actions(request.kind, &request.status),
            request: request.clone(),
        }
    }
}

/// State behind a staff board for a single request type.
///
/// Every mutation is followed by a full reload; rows are never patched in
/// place, so the board always shows what the registry stored.
pub struct RequestBoardViewModel {
    repository: RequestsRepository,
    kind: RequestKind,
    filter: RequestFilter,
    requests: Vec<ServiceRequest>,
    messages: MessageState,
}

impl RequestBoardViewModel {
    pub fn new(repository: RequestsRepository, kind: RequestKind) -> Self {
        Self {
            repository,
            kind,
            filter: RequestFilter::default(),
            requests: Vec::new(),
            messages: MessageState::default(),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    /// Replaces the filter. Statuses are matched case-insensitively against
    /// the lifecycle's spelling. Call [`reload`](Self::reload) to fetch the
    /// matching requests from the registry.
    pub fn set_filter(&mut self, filter: RequestFilter) {
        let mut filter = filter.normalized();
        if let Some(status) = filter.status.as_deref() {
            if let Some(canonical) = lifecycle_for(self.kind).canonical(status) {
                filter.status = Some(canonical.to_string());
            }
        }
        self.filter = filter;
    }

    pub fn messages(&self) -> &MessageState {
        &self.messages
    }

    pub fn dismiss_messages(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Fetches every request matching the current filter. A failed fetch
    /// leaves the board empty.
    pub async fn reload(&mut self) {
        match self.repository.load_board(self.kind, &self.filter).await {
            Ok(requests) => self.requests = requests,
            Err(err) => {
                log::warn!("failed to load {} board: {}", self.kind, err);
                self.requests.clear();
                self.messages.set_error(err);
            }
        }
    }

    pub fn rows(&self) -> Vec<RequestRow> {
        self.filter
            .apply(&self.requests)
            .into_iter()
            .map(RequestRow::from_request)
            .collect()
    }

    pub async fn stats(&self) -> Result<RequestStats, ApiError> {
        self.repository.load_stats(self.kind).await
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<StatusHistoryEntry>, ApiError> {
        self.repository.load_history(self.kind, id).await
    }

    /// Runs a staff action. Blank required fields are reported without
    /// contacting the registry.
    pub async fn perform(
        &mut self,
        id: Uuid,
        action: &StaffAction,
        input: ActionInput,
    ) -> Result<ServiceRequest, ApiError> {
        let input = input.normalized();
        if let Err(err) = action.validate(&input) {
            return Err(self.reject(err.into()));
        }

        let update = StatusUpdate {
            status: action.target.to_string(),
            input,
        };
        let result = self.repository.change_status(self.kind, id, &update).await;
        self.finish(result, action.label).await
    }

    pub async fn acknowledge(
        &mut self,
        id: Uuid,
        acknowledged_by: &str,
        remarks: Option<String>,
    ) -> Result<ServiceRequest, ApiError> {
        if lifecycle_for(self.kind).acknowledge_status.is_none() {
            return Err(self.reject(ApiError::validation(format!(
                "{} requests cannot be acknowledged",
                self.kind.display_name()
            ))));
        }
        let acknowledged_by = acknowledged_by.trim();
        if acknowledged_by.is_empty() {
            return Err(self.reject(ApiError::validation("acknowledged_by is required")));
        }

        let payload = AcknowledgePayload {
            acknowledged_by: acknowledged_by.to_string(),
            remarks: remarks
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        };
        let result = self.repository.acknowledge(self.kind, id, &payload).await;
        self.finish(result, "Acknowledge").await
    }

    /// Admin override. When the request is on the board, the override is
    /// planned locally first so that obvious refusals skip the round trip.
    pub async fn apply_override(
        &mut self,
        id: Uuid,
        payload: OverridePayload,
    ) -> Result<ServiceRequest, ApiError> {
        let planned = self
            .requests
            .iter()
            .find(|request| request.id == id)
            .map(|request| {
                let snapshot = OverrideSnapshot {
                    status: &request.status,
                    amount_due_centavos: request.amount_due_centavos,
                    fee_waived: request.fee_waived,
                    expedited: request.expedited,
                };
                plan_override(lifecycle_for(self.kind), snapshot, &payload).map(|_| ())
            });
        match planned {
            Some(Err(err)) => return Err(self.reject(err.into())),
            None if payload.reason.trim().is_empty() => {
                return Err(self.reject(ApiError::validation(
                    "missing required field(s): reason",
                )))
            }
            _ => {}
        }

        let label = format!("Override ({})", payload.action);
        let result = self
            .repository
            .apply_override(self.kind, id, &payload)
            .await;
        self.finish(result, &label).await
    }

    fn reject(&mut self, err: ApiError) -> ApiError {
        self.messages.set_error(err.clone());
        err
    }

    async fn finish(
        &mut self,
        result: Result<ServiceRequest, ApiError>,
        label: &str,
    ) -> Result<ServiceRequest, ApiError> {
        if !matches!(&result, Err(err) if err.is_transport()) {
            self.reload().await;
        }
        match result {
            Ok(updated) => {
                self.messages.set_success(format!(
                    "{}: {} is now {}",
                    label,
                    updated.reference_number,
                    updated.badge().label
                ));
                Ok(updated)
            }
            Err(err) => {
                log::warn!("{} failed for {}: {}", label, self.kind, err);
                Err(self.reject(err))
            }
        }
    }

    #[cfg(test)]
    fn with_requests(mut self, requests: Vec<ServiceRequest>) -> Self {
        self.requests = requests;
        self
    }
}
