use crate::api::ApiError;

/// Banner shown above the request board. At most one of the two is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageState {
    pub success: Option<String>,
    pub error: Option<ApiError>,
}

impl MessageState {
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.success = Some(msg.into());
        self.error = None;
    }

    pub fn set_error(&mut self, msg: ApiError) {
        self.error = Some(msg);
        self.success = None;
    }

    pub fn clear(&mut self) {
        self.success = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_state_keeps_one_banner() {
        let mut state = MessageState::default();
        state.set_success("Saved");
        assert_eq!(state.success.as_deref(), Some("Saved"));

        state.set_error(ApiError::validation("or_number is required"));
        assert!(state.success.is_none());
        assert_eq!(
            state.error.as_ref().map(|e| e.error.as_str()),
            Some("or_number is required")
        );

        state.clear();
        assert_eq!(state, MessageState::default());
    }
}
