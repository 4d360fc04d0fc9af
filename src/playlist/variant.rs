//! Variant playlist reader
//!
//! Parses the media playlists written by the `hls` muxer far enough to count
//! segments and sum their durations.

use std::path::Path;

use crate::error::Result;

/// One `#EXTINF` entry
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSegment {
    pub duration_secs: f64,
    pub uri: String,
}

/// Parsed media playlist
#[derive(Debug, Clone, Default)]
pub struct VariantPlaylist {
    pub version: Option<u32>,
    pub target_duration: Option<u32>,
    pub playlist_type: Option<String>,
    /// URI of the fMP4 initialization segment (`#EXT-X-MAP`)
    pub init_uri: Option<String>,
    pub segments: Vec<PlaylistSegment>,
    /// `#EXT-X-ENDLIST` was present
    pub ended: bool,
}

impl VariantPlaylist {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut playlist = VariantPlaylist::default();
        let mut pending_duration: Option<f64> = None;

        for line in content.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("#EXTINF:") {
                let value = rest.split(',').next().unwrap_or("");
                pending_duration = value.trim().parse::<f64>().ok();
            } else if let Some(rest) = line.strip_prefix("#EXT-X-TARGETDURATION:") {
                playlist.target_duration = rest.trim().parse().ok();
            } else if let Some(rest) = line.strip_prefix("#EXT-X-VERSION:") {
                playlist.version = rest.trim().parse().ok();
            } else if let Some(rest) = line.strip_prefix("#EXT-X-PLAYLIST-TYPE:") {
                playlist.playlist_type = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("#EXT-X-MAP:") {
                playlist.init_uri = attribute_value(rest, "URI");
            } else if line == "#EXT-X-ENDLIST" {
                playlist.ended = true;
            } else if !line.starts_with('#') {
                if let Some(duration_secs) = pending_duration.take() {
                    playlist.segments.push(PlaylistSegment {
                        duration_secs,
                        uri: line.to_string(),
                    });
                }
            }
        }

        playlist
    }

    /// Sum of all segment durations in seconds
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }

    /// Longest segment duration in seconds
    pub fn max_segment_duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.duration_secs)
            .fold(0.0f64, f64::max)
    }
}

/// Extract a quoted or bare attribute value from an attribute list
fn attribute_value(list: &str, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    list.split(',')
        .map(str::trim)
        .find_map(|attr| attr.strip_prefix(prefix.as_str()))
        .map(|v| v.trim_matches('"').to_string())
}
