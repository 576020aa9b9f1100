//! Platform messages broadcast by administrators.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MessageId, UserId};

/// Maximum length of a message title.
pub const MESSAGE_TITLE_MAX: usize = 200;
/// Maximum length of a message body.
pub const MESSAGE_CONTENT_MAX: usize = 2000;
/// Number of messages shown to everyone.
pub const PUBLIC_MESSAGE_LIMIT: usize = 5;

/// Validation errors for platform messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminMessageValidationError {
    #[error("title must be between 1 and {max} characters")]
    TitleLength { max: usize },
    #[error("content must be between 1 and {max} characters")]
    ContentLength { max: usize },
    #[error("type must be one of: info, warning, alert, update")]
    UnknownType(String),
}

impl AdminMessageValidationError {
    /// Name of the field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::TitleLength { .. } => "title",
            Self::ContentLength { .. } => "content",
            Self::UnknownType(_) => "type",
        }
    }
}

/// Kind of platform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Info,
    Warning,
    Alert,
    Update,
}

impl MessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Alert => "alert",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = AdminMessageValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "alert" => Ok(Self::Alert),
            "update" => Ok(Self::Update),
            other => Err(AdminMessageValidationError::UnknownType(other.to_owned())),
        }
    }
}

fn bounded(
    value: impl Into<String>,
    max: usize,
    error: AdminMessageValidationError,
) -> Result<String, AdminMessageValidationError> {
    let value = value.into().trim().to_owned();
    let length = value.chars().count();
    if length == 0 || length > max {
        return Err(error);
    }
    Ok(value)
}

/// Trimmed, non-empty message title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTitle(String);

impl MessageTitle {
    pub fn new(value: impl Into<String>) -> Result<Self, AdminMessageValidationError> {
        bounded(
            value,
            MESSAGE_TITLE_MAX,
            AdminMessageValidationError::TitleLength {
                max: MESSAGE_TITLE_MAX,
            },
        )
        .map(Self)
    }
}

impl AsRef<str> for MessageTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Trimmed, non-empty message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: impl Into<String>) -> Result<Self, AdminMessageValidationError> {
        bounded(
            value,
            MESSAGE_CONTENT_MAX,
            AdminMessageValidationError::ContentLength {
                max: MESSAGE_CONTENT_MAX,
            },
        )
        .map(Self)
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated input for a new platform message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdminMessage {
    pub title: MessageTitle,
    pub content: MessageContent,
    pub message_type: MessageType,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Validated partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminMessageUpdate {
    pub title: Option<MessageTitle>,
    pub content: Option<MessageContent>,
    pub message_type: Option<MessageType>,
    pub is_active: Option<bool>,
    /// `Some(None)` clears the expiry.
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// A message shown to users until deactivated or expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminMessage {
    pub id: MessageId,
    pub title: MessageTitle,
    pub content: MessageContent,
    pub message_type: MessageType,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminMessage {
    pub fn create(
        id: MessageId,
        author: UserId,
        input: NewAdminMessage,
        now: DateTime<Utc>,
    ) -> Self {
        let NewAdminMessage {
            title,
            content,
            message_type,
            expires_at,
        } = input;
        Self {
            id,
            title,
            content,
            message_type,
            is_active: true,
            expires_at,
            created_by: author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active and not yet expired at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expiry| expiry > now)
    }

    pub fn apply_update(&mut self, update: AdminMessageUpdate, now: DateTime<Utc>) {
        let AdminMessageUpdate {
            title,
            content,
            message_type,
            is_active,
            expires_at,
        } = update;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(message_type) = message_type {
            self.message_type = message_type;
        }
        if let Some(is_active) = is_active {
            self.is_active = is_active;
        }
        if let Some(expires_at) = expires_at {
            self.expires_at = expires_at;
        }
        self.updated_at = now;
    }
}
