//! Accumulators for ordinary (non-event) messages.

use wx_common::{
    Envelope, ImageMessage, LinkMessage, LocationMessage, RequestMessage, TextMessage,
    VideoMessage, VoiceMessage,
};

use super::{number, Accumulator, XmlField};
use crate::error::GatewayResult;

#[derive(Default)]
pub(super) struct TextFields {
    content: String,
}

impl Accumulator for TextFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "Content" => self.content.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        RequestMessage::Text(TextMessage {
            envelope,
            content: self.content,
        })
    }
}

#[derive(Default)]
pub(super) struct ImageFields {
    pic_url: String,
    media_id: String,
}

impl Accumulator for ImageFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "PicUrl" => self.pic_url.clone_from(&field.value),
            "MediaId" => self.media_id.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        RequestMessage::Image(ImageMessage {
            envelope,
            pic_url: self.pic_url,
            media_id: self.media_id,
        })
    }
}

#[derive(Default)]
pub(super) struct VoiceFields {
    media_id: String,
    format: String,
    recognition: Option<String>,
}

impl Accumulator for VoiceFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "MediaId" => self.media_id.clone_from(&field.value),
            "Format" => self.format.clone_from(&field.value),
            "Recognition" => self.recognition = Some(field.value.clone()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        RequestMessage::Voice(VoiceMessage {
            envelope,
            media_id: self.media_id,
            format: self.format,
            recognition: self.recognition,
        })
    }
}

/// Shared by `video` and `shortvideo`; `wrap` picks the variant.
pub(super) struct VideoFields {
    wrap: fn(VideoMessage) -> RequestMessage,
    media_id: String,
    thumb_media_id: String,
}

impl VideoFields {
    pub(super) fn video() -> Self {
        Self::with(RequestMessage::Video)
    }

    pub(super) fn clip() -> Self {
        Self::with(RequestMessage::VideoClip)
    }

    fn with(wrap: fn(VideoMessage) -> RequestMessage) -> Self {
        Self {
            wrap,
            media_id: String::new(),
            thumb_media_id: String::new(),
        }
    }
}

impl Accumulator for VideoFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "MediaId" => self.media_id.clone_from(&field.value),
            "ThumbMediaId" => self.thumb_media_id.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        (self.wrap)(VideoMessage {
            envelope,
            media_id: self.media_id,
            thumb_media_id: self.thumb_media_id,
        })
    }
}

#[derive(Default)]
pub(super) struct LocationFields {
    location_x: f64,
    location_y: f64,
    scale: u32,
    label: String,
}

impl Accumulator for LocationFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "Location_X" => self.location_x = number(field)?,
            "Location_Y" => self.location_y = number(field)?,
            "Scale" => self.scale = number(field)?,
            "Label" => self.label.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        RequestMessage::Location(LocationMessage {
            envelope,
            location_x: self.location_x,
            location_y: self.location_y,
            scale: self.scale,
            label: self.label,
        })
    }
}

#[derive(Default)]
pub(super) struct LinkFields {
    title: String,
    description: String,
    url: String,
}

impl Accumulator for LinkFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "Title" => self.title.clone_from(&field.value),
            "Description" => self.description.clone_from(&field.value),
            "Url" => self.url.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        RequestMessage::Link(LinkMessage {
            envelope,
            title: self.title,
            description: self.description,
            url: self.url,
        })
    }
}
