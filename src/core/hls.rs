use crate::core::{ExtractionError, StreamFormat};
use regex::Regex;
use url::Url;

/// Fetch an HLS manifest and expand it into concrete stream formats.
///
/// Callers that can live without these formats match on the error, log a
/// warning and continue with whatever other formats they have.
pub async fn fetch_hls_formats(
    client: &reqwest::Client,
    manifest_url: &str,
    video_id: &str,
    ext_hint: &str,
    m3u8_id: &str,
) -> Result<Vec<StreamFormat>, ExtractionError> {
    tracing::debug!("{}: downloading m3u8 manifest from {}", video_id, manifest_url);

    let response = client
        .get(manifest_url)
        .send()
        .await
        .map_err(|source| ExtractionError::Http {
            url: manifest_url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Status {
            url: manifest_url.to_string(),
            status,
        });
    }

    let body = response.text().await.map_err(|source| ExtractionError::Http {
        url: manifest_url.to_string(),
        source,
    })?;

    Ok(parse_master_playlist(&body, manifest_url, m3u8_id, ext_hint))
}

/// Expand a master playlist into one format per `#EXT-X-STREAM-INF` variant.
/// A media playlist (segments, no variants) yields a single format.
pub fn parse_master_playlist(
    manifest: &str,
    manifest_url: &str,
    m3u8_id: &str,
    ext_hint: &str,
) -> Vec<StreamFormat> {
    let mut formats = Vec::new();
    let mut pending_attrs: Option<String> = None;

    for line in manifest.lines().map(str::trim) {
        if let Some(attrs) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            pending_attrs = Some(attrs.to_string());
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(attrs) = pending_attrs.take() else {
            continue;
        };

        let bandwidth = attribute(&attrs, "BANDWIDTH").and_then(|v| v.parse::<f64>().ok());
        let tbr = bandwidth.map(|b| b / 1000.0);
        let (width, height) = attribute(&attrs, "RESOLUTION")
            .and_then(|r| parse_resolution(&r))
            .map_or((None, None), |(w, h)| (Some(w), Some(h)));
        let fps = attribute(&attrs, "FRAME-RATE").and_then(|v| v.parse::<f64>().ok());
        let (vcodec, acodec) = attribute(&attrs, "CODECS")
            .map_or((None, None), |c| split_codecs(&c));

        let format_id = match tbr {
            Some(tbr) => format!("{}-{}", m3u8_id, tbr.round() as u64),
            None => format!("{}-{}", m3u8_id, formats.len()),
        };

        formats.push(StreamFormat {
            format_id,
            url: resolve_variant_url(manifest_url, line),
            ext: ext_hint.to_string(),
            width,
            height,
            resolution: width.zip(height).map(|(w, h)| format!("{}x{}", w, h)),
            fps,
            tbr,
            vcodec,
            acodec,
        });
    }

    // No variants at all: the manifest itself is the stream.
    if formats.is_empty() && manifest.contains("#EXTINF") {
        formats.push(StreamFormat::direct(m3u8_id, manifest_url, ext_hint));
    }

    formats
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    // Anchor to an attribute boundary so BANDWIDTH never matches inside
    // AVERAGE-BANDWIDTH.
    let pattern = format!(r#"(?:^|,){}=("[^"]*"|[^,]+)"#, regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(attrs)?.get(1)?.as_str();
    Some(raw.trim_matches('"').to_string())
}

fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn split_codecs(codecs: &str) -> (Option<String>, Option<String>) {
    let mut vcodec = None;
    let mut acodec = None;
    for codec in codecs.split(',').map(str::trim) {
        let family = codec.split('.').next().unwrap_or(codec);
        match family {
            "avc1" | "avc3" | "hvc1" | "hev1" | "vp09" | "av01" => {
                vcodec.get_or_insert_with(|| codec.to_string());
            }
            "mp4a" | "ac-3" | "ec-3" | "opus" | "flac" => {
                acodec.get_or_insert_with(|| codec.to_string());
            }
            _ => {}
        }
    }
    (vcodec, acodec)
}

fn resolve_variant_url(manifest_url: &str, variant: &str) -> String {
    match Url::parse(manifest_url).and_then(|base| base.join(variant)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => variant.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=628000,RESOLUTION=640x360,CODECS=\"avc1.4d401e,mp4a.40.2\"\n\
https://cdn.example.com/360p/index.m3u8\n\
#EXT-X-STREAM-INF:AVERAGE-BANDWIDTH=1900000,BANDWIDTH=2128000,RESOLUTION=1280x720,FRAME-RATE=29.970\n\
720p/index.m3u8\n";

    #[test]
    fn test_master_playlist_variants() {
        let formats = parse_master_playlist(
            MASTER,
            "https://cdn.example.com/master.m3u8",
            "hls",
            "mp4",
        );

        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].format_id, "hls-628");
        assert_eq!(formats[0].tbr, Some(628.0));
        assert_eq!(formats[0].resolution.as_deref(), Some("640x360"));
        assert_eq!(formats[0].vcodec.as_deref(), Some("avc1.4d401e"));
        assert_eq!(formats[0].acodec.as_deref(), Some("mp4a.40.2"));

        // Relative variant URI resolves against the manifest URL.
        assert_eq!(formats[1].url, "https://cdn.example.com/720p/index.m3u8");
        assert_eq!(formats[1].fps, Some(29.97));
        assert_eq!(formats[1].width, Some(1280));
        // Peak bandwidth, not AVERAGE-BANDWIDTH
        assert_eq!(formats[1].tbr, Some(2128.0));
        assert_eq!(formats[1].format_id, "hls-2128");
    }

    #[test]
    fn test_media_playlist_yields_single_format() {
        let manifest = "#EXTM3U\n#EXTINF:6.0,\nsegment0.ts\n#EXT-X-ENDLIST\n";
        let formats =
            parse_master_playlist(manifest, "https://cdn.example.com/media.m3u8", "hls", "mp4");

        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].format_id, "hls");
        assert_eq!(formats[0].url, "https://cdn.example.com/media.m3u8");
    }

    #[test]
    fn test_garbage_manifest_yields_nothing() {
        let formats = parse_master_playlist("<html>not a manifest</html>", "u", "hls", "mp4");
        assert!(formats.is_empty());
    }
}
