//! In-memory list filtering shared by the console and the test store.

use serde::{Deserialize, Serialize};

use crate::model::{Priority, ServiceRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl RequestFilter {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Trims text fields and drops the blank ones.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        }
        Self {
            status: clean(self.status),
            priority: self.priority,
            search: clean(self.search),
        }
    }

    /// Status is compared exactly; search is a case-insensitive substring
    /// match over reference number, subject, requester, department and
    /// barangay.
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        if let Some(status) = self.status.as_deref() {
            if request.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if request.priority != Some(priority) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            if !searchable_fields(request).any(|field| field.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, requests: &'a [ServiceRequest]) -> Vec<&'a ServiceRequest> {
        requests
            .iter()
            .filter(|request| self.matches(request))
            .collect()
    }

    /// Query-string pairs for `GET /api/{resource}`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

fn searchable_fields(request: &ServiceRequest) -> impl Iterator<Item = &str> {
    [
        Some(request.reference_number.as_str()),
        Some(request.subject_name.as_str()),
        Some(request.requester_name.as_str()),
        request.department.as_deref(),
        request.barangay.as_deref(),
    ]
    .into_iter()
    .flatten()
}
