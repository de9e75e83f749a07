//! Media files awaiting moderation.

use serde::{Deserialize, Serialize};

/// Kind of uploaded media, parsed case-insensitively from the stored type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    /// Any other type id (audio, documents). Passed through unclassified.
    Other,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other => "other",
        }
    }

    /// Never fails; unknown values map to `Other`.
    pub fn from_type_id(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("image") {
            Self::Image
        } else if s.eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Other
        }
    }

    /// Directory under the content base path holding originals of this kind.
    pub fn source_dir(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("image"),
            Self::Video => Some("video"),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub id: String,
    /// Raw type id as stored; see [`MediaFile::kind`].
    pub media_type: String,
    pub blocked: bool,
    pub checked: bool,
}

impl MediaFile {
    pub fn new(id: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_type: media_type.into(),
            blocked: false,
            checked: false,
        }
    }

    pub fn kind(&self) -> MediaType {
        MediaType::from_type_id(&self.media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_case_insensitive() {
        assert_eq!(MediaType::from_type_id("IMAGE"), MediaType::Image);
        assert_eq!(MediaType::from_type_id("Video"), MediaType::Video);
        assert_eq!(MediaType::from_type_id("video "), MediaType::Video);
        assert_eq!(MediaType::from_type_id("audio"), MediaType::Other);
        assert_eq!(MediaType::from_type_id(""), MediaType::Other);
    }

    #[test]
    fn test_source_dir() {
        assert_eq!(MediaType::Image.source_dir(), Some("image"));
        assert_eq!(MediaType::Video.source_dir(), Some("video"));
        assert_eq!(MediaType::Other.source_dir(), None);
    }

    #[test]
    fn test_new_media_file_is_unchecked() {
        let file = MediaFile::new("m-1", "Image");
        assert!(!file.checked);
        assert!(!file.blocked);
        assert_eq!(file.kind(), MediaType::Image);
    }
}
