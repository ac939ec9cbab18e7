use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of resolving one URL: either a single playable item or an
/// ordered set of references to further items (a series).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum Extraction {
    Video(MediaRecord),
    Playlist(PlaylistRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    pub title: String,
    pub formats: Vec<StreamFormat>,
    pub thumbnails: Vec<Thumbnail>,
    pub description: Option<String>,
    /// Epoch seconds, fractional when the source reports milliseconds.
    pub timestamp: Option<f64>,
    pub subtitles: HashMap<String, Vec<SubtitleTrack>>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: String,
    pub title: Option<String>,
    pub entries: Vec<PlaylistEntry>,
}

/// Reference to a child item, resolved later through the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub url: String,
    /// Identity of the extractor that must resolve this entry.
    pub ie_key: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    pub url: String,
    pub ext: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
    pub tbr: Option<f64>, // total bitrate in KBit/s
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

impl StreamFormat {
    /// A format known only by its download URL, no manifest behind it.
    pub fn direct(format_id: &str, url: &str, ext: &str) -> Self {
        Self {
            format_id: format_id.to_string(),
            url: url.to_string(),
            ext: ext.to_string(),
            width: None,
            height: None,
            resolution: None,
            fps: None,
            tbr: None,
            vcodec: None,
            acodec: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
}
