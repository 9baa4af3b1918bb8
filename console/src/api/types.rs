use civreg_lifecycle::{InputError, OverrideError, StatusHistoryEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error shown to staff. `error` is displayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{error}")]
pub struct ApiError {
    pub error: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<ApiError> for String {
    fn from(error: ApiError) -> Self {
        error.error
    }
}

impl From<InputError> for ApiError {
    fn from(error: InputError) -> Self {
        ApiError::validation(error.to_string())
    }
}

impl From<OverrideError> for ApiError {
    fn from(error: OverrideError) -> Self {
        ApiError::validation(error.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            code: "VALIDATION_ERROR".to_string(),
            details: None,
        }
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            code: "UNKNOWN".to_string(),
            details: None,
        }
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            code: "REQUEST_FAILED".to_string(),
            details: None,
        }
    }

    /// True when the server was never reached.
    pub fn is_transport(&self) -> bool {
        self.code == "REQUEST_FAILED"
    }

    pub fn is_conflict(&self) -> bool {
        self.code == "CONFLICT"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub data: Vec<StatusHistoryEntry>,
}
