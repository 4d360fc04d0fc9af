//! Segmenter configuration

use serde::{Deserialize, Serialize};

use crate::error::{HlsError, Result};

/// Muxer segmentation settings shared by both codec paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Target segment duration in seconds
    pub target_duration_secs: u32,

    /// Maximum playlist entries; 0 keeps every segment (VOD-style)
    pub playlist_size: u32,

    /// Mark every segment as independently decodable
    pub independent_segments: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            target_duration_secs: 10,
            playlist_size: 0,
            independent_segments: true,
        }
    }
}

/// Settings specific to the lossless (fMP4/FLAC) path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LosslessConfig {
    /// File name of the fMP4 initialization segment
    pub init_filename: String,

    /// Master playlist name handed to the muxer itself.
    ///
    /// `None` leaves the master playlist to the assembler, which is the
    /// default. When set it must differ from [`MasterConfig::filename`].
    pub muxer_master_name: Option<String>,
}

impl Default for LosslessConfig {
    fn default() -> Self {
        Self {
            init_filename: "hls_flac_init.mp4".to_string(),
            muxer_master_name: None,
        }
    }
}

/// Master playlist assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Master playlist file name, written into the output directory
    pub filename: String,

    /// Sort variants by ascending bitrate instead of discovery order
    pub sort_by_bitrate: bool,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            filename: "master.m3u8".to_string(),
            sort_by_bitrate: true,
        }
    }
}

/// Segmenter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Segmentation settings
    pub segment: SegmentConfig,

    /// Lossless path settings
    pub lossless: LosslessConfig,

    /// Master playlist settings
    pub master: MasterConfig,

    /// Write a `.variant.json` manifest next to every produced playlist
    pub write_manifest: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            segment: SegmentConfig::default(),
            lossless: LosslessConfig::default(),
            master: MasterConfig::default(),
            write_manifest: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl SegmenterConfig {
    /// Reject settings the muxer or the assembler cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.segment.target_duration_secs == 0 {
            return Err(HlsError::Config(
                "segment.target_duration_secs must be greater than zero".to_string(),
            ));
        }
        if self.master.filename.trim().is_empty() {
            return Err(HlsError::Config("master.filename must not be empty".to_string()));
        }
        if let Some(name) = &self.lossless.muxer_master_name {
            if name == &self.master.filename {
                return Err(HlsError::Config(format!(
                    "lossless.muxer_master_name '{}' collides with the assembled master playlist",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SegmenterConfig::default();
        assert_eq!(config.segment.target_duration_secs, 10);
        assert_eq!(config.segment.playlist_size, 0);
        assert!(config.segment.independent_segments);
        assert_eq!(config.master.filename, "master.m3u8");
        assert!(config.lossless.muxer_master_name.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut config = SegmenterConfig::default();
        config.segment.target_duration_secs = 0;
        assert!(matches!(config.validate(), Err(HlsError::Config(_))));
    }

    #[test]
    fn test_muxer_master_collision_rejected() {
        let mut config = SegmenterConfig::default();
        config.lossless.muxer_master_name = Some("master.m3u8".to_string());
        assert!(config.validate().is_err());

        config.lossless.muxer_master_name = Some("muxer_master.m3u8".to_string());
        assert!(config.validate().is_ok());
    }
}
