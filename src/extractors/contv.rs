use crate::core::http::{build_client, fetch_json};
use crate::core::{
    hls, Extraction, ExtractionError, Extractor, MediaRecord, PlaylistEntry, PlaylistRecord,
    StreamFormat, SubtitleTrack, Thumbnail,
};
use crate::utils::{float_or_none, int_or_none};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

const METAX_API_BASE: &str = "http://metax.contv.live.junctiontv.net/metax/2.5";
const SITE_BASE: &str = "https://www.contv.com";
const VALID_URL: &str = r"^https?://(?:www\.)?contv\.com/details-movie/([^/]+)";

pub struct ContvExtractor {
    client: reqwest::Client,
}

impl ContvExtractor {
    /// Stable identity token; playlist entries carry it so the engine can
    /// route children back here without holding a live instance.
    pub const IE_KEY: &'static str = "CONtv";

    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }

    pub fn extract_video_id(&self, url: &Url) -> Option<String> {
        let re = Regex::new(VALID_URL).ok()?;
        let captures = re.captures(url.as_str())?;
        Some(captures.get(1)?.as_str().to_string())
    }

    /// Walk the seriesfeed document and emit one entry per episode that
    /// carries a non-empty id, in feed order. A show with no episodes is a
    /// valid empty playlist.
    pub fn playlist_record(video_id: &str, details: &Value, seasons: &Value) -> PlaylistRecord {
        let mut entries = Vec::new();

        for season in seasons.as_array().into_iter().flatten() {
            for episode in season
                .get("episodes")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let Some(episode_id) = episode
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                else {
                    continue;
                };
                entries.push(PlaylistEntry {
                    url: format!("{}/details-movie/{}", SITE_BASE, episode_id),
                    ie_key: Self::IE_KEY.to_string(),
                    id: episode_id.to_string(),
                });
            }
        }

        PlaylistRecord {
            id: video_id.to_string(),
            title: details
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            entries,
        }
    }

    /// Build the single-item record from the details document. Only the
    /// nested `details` object and the `title` are required; every other
    /// field degrades to absent. `formats` arrives pre-filled with whatever
    /// the HLS expansion produced.
    pub fn media_record(
        video_id: &str,
        details: &Value,
        mut formats: Vec<StreamFormat>,
    ) -> Result<MediaRecord, ExtractionError> {
        let m_details = details
            .get("details")
            .ok_or(ExtractionError::MissingField("details"))?;
        let title = details
            .get("title")
            .and_then(Value::as_str)
            .ok_or(ExtractionError::MissingField("title"))?;

        if let Some(mp4_url) = m_details.get("media_mp4_url").and_then(Value::as_str) {
            formats.push(StreamFormat::direct("http", mp4_url, "mp4"));
        }

        // The API keys captions by display name and gives no language tag;
        // everything lands in the "en" bucket.
        let mut subtitles: HashMap<String, Vec<SubtitleTrack>> = HashMap::new();
        if let Some(captions) = m_details.get("captions").and_then(Value::as_object) {
            for caption_url in captions.values().filter_map(Value::as_str) {
                subtitles
                    .entry("en".to_string())
                    .or_default()
                    .push(SubtitleTrack {
                        url: caption_url.to_string(),
                    });
            }
        }

        let mut thumbnails = Vec::new();
        for image in m_details
            .get("images")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(image_url) = image
                .get("url")
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
            else {
                continue;
            };
            thumbnails.push(Thumbnail {
                url: image_url.to_string(),
                width: int_or_none(image.get("width")).and_then(|w| u32::try_from(w).ok()),
                height: int_or_none(image.get("height")).and_then(|h| u32::try_from(h).ok()),
            });
        }

        let mut description = None;
        for key in [
            "large_description",
            "medium_description",
            "small_description",
            "description",
        ] {
            if let Some(d) = m_details
                .get(key)
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
            {
                description = Some(d.to_string());
                break;
            }
        }

        Ok(MediaRecord {
            id: video_id.to_string(),
            title: title.to_string(),
            formats,
            thumbnails,
            description,
            timestamp: float_or_none(details.get("metax_added_on"), 1000.0),
            subtitles,
            duration: float_or_none(m_details.get("duration"), 1000.0),
            view_count: int_or_none(details.get("num_watched")).and_then(|n| u64::try_from(n).ok()),
            like_count: int_or_none(details.get("num_fav")).and_then(|n| u64::try_from(n).ok()),
            categories: string_list(details.get("category")),
            tags: string_list(details.get("tags")),
            season_number: int_or_none(details.get("season")).and_then(|n| u32::try_from(n).ok()),
            episode_number: int_or_none(details.get("episode")).and_then(|n| u32::try_from(n).ok()),
            release_year: int_or_none(details.get("pub_year")).and_then(|n| i32::try_from(n).ok()),
        })
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[async_trait]
impl Extractor for ContvExtractor {
    fn name(&self) -> &'static str {
        Self::IE_KEY
    }

    fn suitable(&self, url: &Url) -> bool {
        Regex::new(VALID_URL)
            .map(|re| re.is_match(url.as_str()))
            .unwrap_or(false)
    }

    async fn extract(&self, url: &Url) -> Result<Extraction> {
        let video_id = self
            .extract_video_id(url)
            .ok_or_else(|| ExtractionError::UnsupportedUrl(url.to_string()))?;

        let details = fetch_json(
            &self.client,
            &format!("{}/details/{}", METAX_API_BASE, video_id),
            &video_id,
            Some(&[("device", "web")]),
        )
        .await?;

        if details.get("type").and_then(Value::as_str) == Some("episodic") {
            let seasons = fetch_json(
                &self.client,
                &format!("{}/seriesfeed/json/{}", METAX_API_BASE, video_id),
                &video_id,
                None,
            )
            .await?;

            let playlist = Self::playlist_record(&video_id, &details, &seasons);
            tracing::info!("{}: series feed with {} episodes", video_id, playlist.entries.len());
            return Ok(Extraction::Playlist(playlist));
        }

        // Manifest expansion is best-effort: a broken manifest must not sink
        // the extraction while a direct mp4 URL may still be usable.
        let mut hls_formats = Vec::new();
        if let Some(hls_url) = details
            .get("details")
            .and_then(|d| d.get("media_hls_url"))
            .and_then(Value::as_str)
        {
            match hls::fetch_hls_formats(&self.client, hls_url, &video_id, "mp4", "hls").await {
                Ok(formats) => hls_formats = formats,
                Err(err) => {
                    tracing::warn!("{}: failed to expand HLS manifest: {}", video_id, err)
                }
            }
        }

        let record = Self::media_record(&video_id, &details, hls_formats)?;
        Ok(Extraction::Video(record))
    }
}
