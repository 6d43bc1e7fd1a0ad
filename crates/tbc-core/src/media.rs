//! Media kinds, asset slots and the naming rules for uploaded assets.
//!
//! Everything in here is pure: deriving an identifier from a filename,
//! building the logical folder an asset is grouped under, and checking a
//! file extension against the allow-list for its kind.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg"];
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["aac", "he_aac", "mp3", "ogg", "opus", "m4a", "webm"];
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "3gp", "mkv", "mpeg", "f4v", "m3u8", "ts", "dash", "ismv",
];

/// Kind of media stored at the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// Segment used for this kind inside a logical folder (`sermon/audios/2026`).
    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Audio => "audios",
            MediaKind::Video => "videos",
        }
    }

    /// Audio and video go through the chunked upload path.
    pub fn is_large(&self) -> bool {
        !matches!(self, MediaKind::Image)
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A named position on a record that holds exactly one asset of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetSlot {
    pub name: &'static str,
    pub kind: MediaKind,
}

pub const COVER_IMAGE: AssetSlot = AssetSlot {
    name: "cover_image",
    kind: MediaKind::Image,
};

pub const AUDIO_FILE: AssetSlot = AssetSlot {
    name: "audio_file",
    kind: MediaKind::Audio,
};

pub const VIDEO_FILE: AssetSlot = AssetSlot {
    name: "video_file",
    kind: MediaKind::Video,
};

/// One uploaded object as the rest of the system sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaAsset {
    pub identifier: String,
    pub folder: String,
    pub remote_url: String,
    pub kind: MediaKind,
}

impl MediaAsset {
    /// Full identifier as known to the media host: `{folder}/{identifier}`.
    pub fn public_id(&self) -> String {
        namespaced_identifier(&self.folder, &self.identifier)
    }

    /// Rebuild an asset from a stored public id. A public id without a
    /// folder segment maps to an empty folder.
    pub fn from_public_id(public_id: &str, remote_url: String, kind: MediaKind) -> Self {
        let (folder, identifier) = match public_id.rsplit_once('/') {
            Some((folder, identifier)) => (folder.to_string(), identifier.to_string()),
            None => (String::new(), public_id.to_string()),
        };
        Self {
            identifier,
            folder,
            remote_url,
            kind,
        }
    }
}

/// Turn a user supplied filename into an asset identifier.
///
/// Surrounding whitespace is stripped, inner spaces become underscores and
/// the last extension is dropped. An empty result is allowed.
pub fn derive_identifier(original_filename: &str) -> String {
    let cleaned = original_filename.trim().replace(' ', "_");
    match cleaned.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => cleaned,
    }
}

/// Lowercased text after the last `.`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .trim()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// `{record_type}/{kind folder}/{year}`, e.g. `podcast/videos/2026`.
pub fn logical_folder(record_type: &str, kind: MediaKind, year: i32) -> String {
    format!("{}/{}/{}", record_type, kind.folder_name(), year)
}

pub fn namespaced_identifier(folder: &str, identifier: &str) -> String {
    if folder.is_empty() {
        identifier.to_string()
    } else {
        format!("{}/{}", folder, identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported {kind} type '{}' for file '{filename}'", .extension.as_deref().unwrap_or(""))]
pub struct UnsupportedMediaType {
    pub kind: MediaKind,
    pub filename: String,
    pub extension: Option<String>,
}

/// Per-kind extension allow-lists. Matching ignores case.
#[derive(Debug, Clone)]
pub struct AllowedExtensions {
    image: Vec<String>,
    audio: Vec<String>,
    video: Vec<String>,
}

impl AllowedExtensions {
    pub fn new(image: Vec<String>, audio: Vec<String>, video: Vec<String>) -> Self {
        fn normalize(list: Vec<String>) -> Vec<String> {
            list.into_iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect()
        }

        Self {
            image: normalize(image),
            audio: normalize(audio),
            video: normalize(video),
        }
    }

    pub fn for_kind(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }

    /// Returns the matched extension.
    pub fn check(&self, kind: MediaKind, filename: &str) -> Result<String, UnsupportedMediaType> {
        let extension = file_extension(filename);
        match extension {
            Some(ref ext) if self.for_kind(kind).iter().any(|allowed| allowed == ext) => {
                Ok(ext.clone())
            }
            _ => Err(UnsupportedMediaType {
                kind,
                filename: filename.to_string(),
                extension,
            }),
        }
    }
}

impl Default for AllowedExtensions {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self::new(
            owned(DEFAULT_IMAGE_EXTENSIONS),
            owned(DEFAULT_AUDIO_EXTENSIONS),
            owned(DEFAULT_VIDEO_EXTENSIONS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_identifier_strips_and_replaces_spaces() {
        assert_eq!(derive_identifier(" My File.MP3 "), "My_File");
    }

    #[test]
    fn test_derive_identifier_drops_only_last_extension() {
        assert_eq!(derive_identifier("a.b.c"), "a.b");
    }

    #[test]
    fn test_derive_identifier_clean_name_unchanged() {
        assert_eq!(derive_identifier("clean_name"), "clean_name");
        assert_eq!(
            derive_identifier(&derive_identifier("clean_name")),
            "clean_name"
        );
    }

    #[test]
    fn test_derive_identifier_may_be_empty() {
        assert_eq!(derive_identifier("   "), "");
        assert_eq!(derive_identifier(".mp3"), "");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cover.PNG"), Some("png".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_logical_folder() {
        assert_eq!(
            logical_folder("sermon", MediaKind::Image, 2026),
            "sermon/images/2026"
        );
        assert_eq!(
            logical_folder("sermon", MediaKind::Audio, 2026),
            "sermon/audios/2026"
        );
        assert_eq!(
            logical_folder("podcast", MediaKind::Video, 2025),
            "podcast/videos/2025"
        );
    }

    #[test]
    fn test_image_extensions_accepted() {
        let allowed = AllowedExtensions::default();
        for ext in DEFAULT_IMAGE_EXTENSIONS {
            let filename = format!("cover.{}", ext);
            assert_eq!(
                allowed.check(MediaKind::Image, &filename).as_deref(),
                Ok(*ext)
            );
        }
        assert!(allowed.check(MediaKind::Image, "COVER.JPG").is_ok());
    }

    #[test]
    fn test_other_extensions_rejected_for_image() {
        let allowed = AllowedExtensions::default();
        for filename in ["cover.gif", "cover.mp3", "cover.webp", "cover", "cover.png.exe"] {
            let err = allowed.check(MediaKind::Image, filename).unwrap_err();
            assert_eq!(err.kind, MediaKind::Image);
            assert_eq!(err.filename, filename);
        }
    }

    #[test]
    fn test_audio_and_video_lists_are_separate() {
        let allowed = AllowedExtensions::default();
        assert!(allowed.check(MediaKind::Audio, "sermon.mp3").is_ok());
        assert!(allowed.check(MediaKind::Video, "sermon.mp3").is_err());
        assert!(allowed.check(MediaKind::Video, "episode.mkv").is_ok());
        assert!(allowed.check(MediaKind::Audio, "episode.mkv").is_err());
    }

    #[test]
    fn test_custom_lists_are_normalized() {
        let allowed = AllowedExtensions::new(
            vec![" .PNG ".to_string(), String::new()],
            vec!["MP3".to_string()],
            vec![],
        );
        assert_eq!(allowed.for_kind(MediaKind::Image), ["png".to_string()]);
        assert!(allowed.check(MediaKind::Audio, "a.mp3").is_ok());
        assert!(allowed.check(MediaKind::Video, "a.mp4").is_err());
    }

    #[test]
    fn test_public_id_round_trip_through_storage_form() {
        let asset = MediaAsset {
            identifier: "cover".to_string(),
            folder: "sermon/images/2026".to_string(),
            remote_url: "https://cdn.example/cover.png".to_string(),
            kind: MediaKind::Image,
        };
        assert_eq!(asset.public_id(), "sermon/images/2026/cover");

        let rebuilt = MediaAsset::from_public_id(
            &asset.public_id(),
            asset.remote_url.clone(),
            MediaKind::Image,
        );
        assert_eq!(rebuilt, asset);
    }

    #[test]
    fn test_from_public_id_without_folder() {
        let asset = MediaAsset::from_public_id("bare", String::new(), MediaKind::Audio);
        assert_eq!(asset.folder, "");
        assert_eq!(asset.identifier, "bare");
        assert_eq!(asset.public_id(), "bare");
    }

    #[test]
    fn test_media_kind_parse_and_display() {
        assert_eq!("VIDEO".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("document".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Audio.to_string(), "audio");
        assert!(MediaKind::Audio.is_large());
        assert!(!MediaKind::Image.is_large());
    }
}
