use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Message handed back to the chat host for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub status: ReplyStatus,
    pub content: String,
    /// Only visible to the requesting user.
    pub ephemeral: bool,
    /// Users the message is allowed to ping.
    pub mentions: Vec<String>,
}

impl Reply {
    pub fn success(content: impl Into<String>, ephemeral: bool, mentions: Vec<String>) -> Self {
        Self {
            status: ReplyStatus::Success,
            content: content.into(),
            ephemeral,
            mentions,
        }
    }

    /// Error replies are shown to the requester only and never ping anyone.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            content: content.into(),
            ephemeral: true,
            mentions: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ReplyStatus::Error
    }
}
