//! Request Message Types
//!
//! Typed messages pushed by the platform. Each variant corresponds to exactly
//! one `MsgType` tag; events further dispatch on their `Event` tag.

use serde::Serialize;

use super::event::Event;

/// Routing and timing metadata common to every inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    /// Account that received the message (`ToUserName`).
    pub to_user: String,
    /// Sender open id (`FromUserName`).
    pub from_user: String,
    /// Creation time in milliseconds.
    pub create_time: i64,
    /// Platform message id; events carry none.
    pub msg_id: Option<String>,
    /// Originating article data id for messages sent from a multi-article push.
    pub msg_data_id: Option<String>,
    /// Article index markers, in document order.
    pub article_indexes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMessage {
    pub envelope: Envelope,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMessage {
    pub envelope: Envelope,
    pub pic_url: String,
    pub media_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceMessage {
    pub envelope: Envelope,
    pub media_id: String,
    /// Codec name such as `amr` or `speex`.
    pub format: String,
    /// Speech recognition result, when enabled for the account.
    pub recognition: Option<String>,
}

/// Payload shared by `video` and `shortvideo` messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMessage {
    pub envelope: Envelope,
    pub media_id: String,
    pub thumb_media_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMessage {
    pub envelope: Envelope,
    /// Latitude.
    pub location_x: f64,
    /// Longitude.
    pub location_y: f64,
    /// Map zoom level.
    pub scale: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkMessage {
    pub envelope: Envelope,
    pub title: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMessage {
    pub envelope: Envelope,
    pub event: Event,
}

/// A parsed inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg_type", rename_all = "snake_case")]
pub enum RequestMessage {
    Text(TextMessage),
    Image(ImageMessage),
    Voice(VoiceMessage),
    Video(VideoMessage),
    /// Short video clip (`shortvideo`).
    VideoClip(VideoMessage),
    Location(LocationMessage),
    Link(LinkMessage),
    Event(EventMessage),
}

impl RequestMessage {
    /// Every supported `MsgType` tag.
    pub const MSG_TYPES: &'static [&'static str] = &[
        "text",
        "image",
        "voice",
        "video",
        "shortvideo",
        "location",
        "link",
        "event",
    ];

    /// The wire `MsgType` tag of this variant.
    pub const fn msg_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Voice(_) => "voice",
            Self::Video(_) => "video",
            Self::VideoClip(_) => "shortvideo",
            Self::Location(_) => "location",
            Self::Link(_) => "link",
            Self::Event(_) => "event",
        }
    }

    /// The wire `Event` tag, for event messages.
    pub const fn event_type(&self) -> Option<&'static str> {
        match self {
            Self::Event(e) => Some(e.event.event_type()),
            _ => None,
        }
    }

    pub const fn envelope(&self) -> &Envelope {
        match self {
            Self::Text(m) => &m.envelope,
            Self::Image(m) => &m.envelope,
            Self::Voice(m) => &m.envelope,
            Self::Video(m) | Self::VideoClip(m) => &m.envelope,
            Self::Location(m) => &m.envelope,
            Self::Link(m) => &m.envelope,
            Self::Event(m) => &m.envelope,
        }
    }

    /// Sender open id.
    pub fn from_user(&self) -> &str {
        &self.envelope().from_user
    }

    /// Receiving account id.
    pub fn to_user(&self) -> &str {
        &self.envelope().to_user
    }

    pub fn msg_id(&self) -> Option<&str> {
        self.envelope().msg_id.as_deref()
    }

    /// Key callers can use for deduplication: the message id, or
    /// sender plus creation time for events.
    pub fn dedup_key(&self) -> String {
        let envelope = self.envelope();
        match &envelope.msg_id {
            Some(id) => id.clone(),
            None => format!("{}:{}", envelope.from_user, envelope.create_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            to_user: "gh_account".into(),
            from_user: "o_user".into(),
            create_time: 1_700_000_000_000,
            ..Envelope::default()
        }
    }

    #[test]
    fn tags_are_explicit() {
        let text = RequestMessage::Text(TextMessage {
            envelope: envelope(),
            content: "hi".into(),
        });
        assert_eq!(text.msg_type(), "text");
        assert_eq!(text.event_type(), None);

        let clip = RequestMessage::VideoClip(VideoMessage {
            envelope: envelope(),
            media_id: "m".into(),
            thumb_media_id: "t".into(),
        });
        assert_eq!(clip.msg_type(), "shortvideo");

        let event = RequestMessage::Event(EventMessage {
            envelope: envelope(),
            event: Event::Unsubscribe,
        });
        assert_eq!(event.msg_type(), "event");
        assert_eq!(event.event_type(), Some("unsubscribe"));
    }

    #[test]
    fn dedup_key_prefers_msg_id() {
        let mut env = envelope();
        let event = RequestMessage::Event(EventMessage {
            envelope: env.clone(),
            event: Event::Unsubscribe,
        });
        assert_eq!(event.dedup_key(), "o_user:1700000000000");

        env.msg_id = Some("42".into());
        let text = RequestMessage::Text(TextMessage {
            envelope: env,
            content: String::new(),
        });
        assert_eq!(text.dedup_key(), "42");
    }

    #[test]
    fn serializes_with_type_tag() {
        let text = RequestMessage::Text(TextMessage {
            envelope: envelope(),
            content: "hi".into(),
        });
        let json = serde_json::to_value(&text).expect("serialize");
        assert_eq!(json["msg_type"], "text");
        assert_eq!(json["content"], "hi");
    }
}
