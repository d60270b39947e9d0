//! Message Parser
//!
//! Turns a pushed XML document into one [`RequestMessage`] variant.
//!
//! The document is first flattened into leaf fields (see [`flatten`]). The
//! `MsgType` and `Event` tags select a per-variant accumulator; envelope tags
//! are lifted out by the outer loop, `Id*` tags are collected as article
//! index markers, and every other field is offered to the accumulator.

mod events;
mod messages;
pub mod xml;

use std::str::FromStr;

use tracing::debug;
use wx_common::{Envelope, RequestMessage};

use crate::error::{GatewayError, GatewayResult};

pub use xml::flatten;

pub const TO_USER_NAME: &str = "ToUserName";
pub const FROM_USER_NAME: &str = "FromUserName";
pub const CREATE_TIME: &str = "CreateTime";
pub const MSG_TYPE: &str = "MsgType";
pub const EVENT: &str = "Event";
pub const MSG_ID: &str = "MsgId";
pub const MSG_DATA_ID: &str = "MsgDataId";
pub const ENCRYPT: &str = "Encrypt";

/// Prefix of article index marker tags (`Idx`).
const ARTICLE_INDEX_PREFIX: &str = "Id";

/// One leaf element of a flattened document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlField {
    /// Enclosing element names below the document root, outermost first.
    pub path: Vec<String>,
    pub name: String,
    pub value: String,
}

impl XmlField {
    pub fn top_level(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether `container` is one of this field's ancestors.
    pub fn within(&self, container: &str) -> bool {
        self.path.iter().any(|p| p == container)
    }
}

/// Leaf fields of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlFields(Vec<XmlField>);

impl XmlFields {
    /// Build from flat top-level `(tag, text)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| XmlField::top_level(k, v))
                .collect(),
        )
    }

    pub fn push(&mut self, field: XmlField) {
        self.0.push(field);
    }

    /// Text of the first top-level field named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|f| f.is_top_level() && f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, XmlField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a XmlFields {
    type Item = &'a XmlField;
    type IntoIter = std::slice::Iter<'a, XmlField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Collects the fields of one variant.
trait Accumulator {
    /// Consume `field`. `Ok(false)` means the tag is not part of this variant.
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool>;

    /// Whether nested fields are offered too. Only variants with container
    /// elements resolve fields by their ancestry; the rest see top-level
    /// fields only.
    fn reads_nested(&self) -> bool {
        false
    }

    /// Build the completed message.
    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage;
}

/// Parse an XML document into a typed message.
pub fn parse_xml(xml: &str) -> GatewayResult<RequestMessage> {
    parse(&flatten(xml)?)
}

/// Parse flattened fields into a typed message.
pub fn parse(fields: &XmlFields) -> GatewayResult<RequestMessage> {
    let msg_type = fields.get(MSG_TYPE).unwrap_or_default();
    let mut accumulator = select(msg_type, fields.get(EVENT))?;
    let mut envelope = Envelope::default();

    for field in fields {
        if field.is_top_level() {
            match field.name.as_str() {
                TO_USER_NAME => {
                    envelope.to_user.clone_from(&field.value);
                    continue;
                }
                FROM_USER_NAME => {
                    envelope.from_user.clone_from(&field.value);
                    continue;
                }
                CREATE_TIME => {
                    envelope.create_time = seconds_to_millis(field)?;
                    continue;
                }
                MSG_ID => {
                    envelope.msg_id = Some(field.value.clone());
                    continue;
                }
                MSG_DATA_ID => {
                    envelope.msg_data_id = Some(field.value.clone());
                    continue;
                }
                MSG_TYPE | EVENT => continue,
                _ => {}
            }
        }

        if field.name.starts_with(ARTICLE_INDEX_PREFIX) {
            envelope.article_indexes.push(field.value.clone());
            continue;
        }

        let offered = field.is_top_level() || accumulator.reads_nested();
        if !offered || !accumulator.accept(field)? {
            debug!(
                msg_type,
                tag = %field.name,
                path = %field.path.join("/"),
                "Ignoring unrecognized tag"
            );
        }
    }

    Ok(accumulator.finish(envelope))
}

/// Pick the accumulator for a `(MsgType, Event)` pair. Tags compare
/// case-insensitively.
fn select(msg_type: &str, event: Option<&str>) -> GatewayResult<Box<dyn Accumulator>> {
    let accumulator: Box<dyn Accumulator> = match msg_type.to_ascii_lowercase().as_str() {
        "text" => Box::<messages::TextFields>::default(),
        "image" => Box::<messages::ImageFields>::default(),
        "voice" => Box::<messages::VoiceFields>::default(),
        "video" => Box::new(messages::VideoFields::video()),
        "shortvideo" => Box::new(messages::VideoFields::clip()),
        "location" => Box::<messages::LocationFields>::default(),
        "link" => Box::<messages::LinkFields>::default(),
        "event" => return events::select(event.unwrap_or_default()),
        _ => return Err(GatewayError::UnknownMessageType(msg_type.to_string())),
    };
    Ok(accumulator)
}

/// Parse a numeric field. Empty text yields the default.
fn number<T>(field: &XmlField) -> GatewayResult<T>
where
    T: FromStr + Default,
{
    let text = field.value.trim();
    if text.is_empty() {
        return Ok(T::default());
    }
    text.parse().map_err(|_| {
        GatewayError::MalformedPayload(format!("{} is not a number: {:?}", field.name, text))
    })
}

/// Parse a seconds timestamp into milliseconds.
fn seconds_to_millis(field: &XmlField) -> GatewayResult<i64> {
    number::<i64>(field)?.checked_mul(1000).ok_or_else(|| {
        GatewayError::MalformedPayload(format!("{} out of range: {}", field.name, field.value))
    })
}
