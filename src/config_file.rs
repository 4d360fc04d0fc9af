//! Configuration file support
//!
//! Loads segmenter configuration from TOML files. Every section is optional;
//! missing values fall back to [`SegmenterConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{LosslessConfig, MasterConfig, SegmentConfig, SegmenterConfig};
use crate::error::{HlsError, Result};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Segment settings
    pub segment: Option<SegmentSettings>,
    /// Lossless path settings
    pub lossless: Option<LosslessSettings>,
    /// Master playlist settings
    pub master: Option<MasterSettings>,
    /// Sidecar manifest settings
    pub manifest: Option<ManifestSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSettings {
    /// Target segment duration in seconds
    pub target_duration_secs: Option<u32>,
    /// Maximum playlist entries (0 = unlimited)
    pub playlist_size: Option<u32>,
    /// Emit independent segments
    pub independent_segments: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LosslessSettings {
    /// fMP4 init segment file name
    pub init_filename: Option<String>,
    /// Master playlist name passed to the muxer
    pub muxer_master_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterSettings {
    /// Master playlist file name
    pub filename: Option<String>,
    /// Sort variants by bitrate
    pub sort_by_bitrate: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSettings {
    /// Write `.variant.json` sidecars
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| HlsError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HlsError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file contents
    pub fn default_config() -> Self {
        let defaults = SegmenterConfig::default();
        Self {
            segment: Some(SegmentSettings {
                target_duration_secs: Some(defaults.segment.target_duration_secs),
                playlist_size: Some(defaults.segment.playlist_size),
                independent_segments: Some(defaults.segment.independent_segments),
            }),
            lossless: Some(LosslessSettings {
                init_filename: Some(defaults.lossless.init_filename),
                muxer_master_name: None,
            }),
            master: Some(MasterSettings {
                filename: Some(defaults.master.filename),
                sort_by_bitrate: Some(defaults.master.sort_by_bitrate),
            }),
            manifest: Some(ManifestSettings {
                enabled: defaults.write_manifest,
            }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some(defaults.log_format),
            }),
        }
    }

    /// Convert to SegmenterConfig
    pub fn into_segmenter_config(self) -> SegmenterConfig {
        let defaults = SegmenterConfig::default();

        let segment = match self.segment {
            Some(s) => SegmentConfig {
                target_duration_secs: s
                    .target_duration_secs
                    .unwrap_or(defaults.segment.target_duration_secs),
                playlist_size: s.playlist_size.unwrap_or(defaults.segment.playlist_size),
                independent_segments: s
                    .independent_segments
                    .unwrap_or(defaults.segment.independent_segments),
            },
            None => defaults.segment,
        };

        let lossless = match self.lossless {
            Some(l) => LosslessConfig {
                init_filename: l.init_filename.unwrap_or(defaults.lossless.init_filename),
                muxer_master_name: l.muxer_master_name,
            },
            None => defaults.lossless,
        };

        let master = match self.master {
            Some(m) => MasterConfig {
                filename: m.filename.unwrap_or(defaults.master.filename),
                sort_by_bitrate: m.sort_by_bitrate.unwrap_or(defaults.master.sort_by_bitrate),
            },
            None => defaults.master,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        SegmenterConfig {
            segment,
            lossless,
            master,
            write_manifest: self
                .manifest
                .map(|m| m.enabled)
                .unwrap_or(defaults.write_manifest),
            log_level,
            log_format,
        }
    }
}

/// Load a configuration file if it exists; a missing file yields defaults
pub fn load<P: AsRef<Path>>(path: P) -> Result<SegmenterConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(SegmenterConfig::default());
    }
    Ok(ConfigFile::from_file(path)?.into_segmenter_config())
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigFile::default_config().to_file(path)
}
