//! Reply Types
//!
//! Replies produced by application handlers. `Acknowledge` and `Suppress` are
//! protocol sentinels and never pass through rendering or encryption.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::request::RequestMessage;

/// One entry of a news reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub pic_url: String,
    pub url: String,
}

/// Content of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum ReplyBody {
    Text {
        content: String,
    },
    Image {
        media_id: String,
    },
    Voice {
        media_id: String,
    },
    Video {
        media_id: String,
        title: String,
        description: String,
    },
    Music {
        title: String,
        description: String,
        music_url: String,
        hq_music_url: String,
        thumb_media_id: String,
    },
    News {
        articles: Vec<Article>,
    },
}

impl ReplyBody {
    /// The wire `MsgType` tag of this body.
    pub const fn msg_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Voice { .. } => "voice",
            Self::Video { .. } => "video",
            Self::Music { .. } => "music",
            Self::News { .. } => "news",
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// A content reply addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient open id.
    pub to_user: String,
    /// Sending account.
    pub from_user: String,
    /// Creation time in milliseconds.
    pub create_time: i64,
    pub body: ReplyBody,
}

impl OutboundMessage {
    /// Address a reply back to the sender of `request`, stamped with the
    /// current time.
    pub fn reply_to(request: &RequestMessage, body: ReplyBody) -> Self {
        Self {
            to_user: request.from_user().to_string(),
            from_user: request.to_user().to_string(),
            create_time: Utc::now().timestamp_millis(),
            body,
        }
    }
}

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain `success`; tells the platform the message was received.
    Acknowledge,
    /// Empty body; tells the platform not to retry and to send nothing.
    Suppress,
    Message(OutboundMessage),
}

impl Reply {
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Acknowledge | Self::Suppress)
    }

    /// Shorthand for a text reply to `request`.
    pub fn text(request: &RequestMessage, content: impl Into<String>) -> Self {
        Self::Message(OutboundMessage::reply_to(request, ReplyBody::text(content)))
    }
}

impl From<OutboundMessage> for Reply {
    fn from(message: OutboundMessage) -> Self {
        Self::Message(message)
    }
}
