//! Media Kinds
//!
//! Static mapping from platform media kind to accepted file extensions.

use serde::{Deserialize, Serialize};

/// Media kind accepted by the platform's upload endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Voice,
    Video,
    /// Thumbnail for video and music replies.
    Thumb,
}

impl MediaKind {
    pub const ALL: [Self; 4] = [Self::Image, Self::Voice, Self::Video, Self::Thumb];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Thumb => "thumb",
        }
    }

    /// Lower-case file extensions accepted for this kind.
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["bmp", "png", "jpeg", "jpg", "gif"],
            Self::Voice => &["mp3", "wma", "wav", "amr"],
            Self::Video => &["mp4"],
            Self::Thumb => &["jpg"],
        }
    }

    /// Whether `file_name` has an extension accepted for this kind.
    pub fn accepts(&self, file_name: &str) -> bool {
        extension_of(file_name).is_some_and(|ext| self.extensions().contains(&ext.as_str()))
    }

    /// First kind accepting the file's extension. `jpg` resolves to `Image`.
    pub fn for_file(file_name: &str) -> Option<Self> {
        let ext = extension_of(file_name)?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
