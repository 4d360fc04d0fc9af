//! Sidecar variant manifests
//!
//! Every produced variant playlist gets a `<stem>.variant.json` file next to
//! it recording the codec path and the bitrate it was produced at. The master
//! assembler reads these in preference to parsing playlist file names.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HlsError, Result};
use crate::segment::{file_name_of, CodecKind, VariantReport};

pub const MANIFEST_SUFFIX: &str = ".variant.json";

/// Description of one variant written by the segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantManifest {
    pub kind: CodecKind,
    pub bitrate_kbps: u32,
    /// Playlist file name, relative to the manifest's directory
    pub playlist: String,
    pub segment_count: usize,
    pub duration_secs: f64,
    /// Source file name, without its directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VariantManifest {
    pub fn from_report(report: &VariantReport, source: &Path) -> Self {
        let source_name = file_name_of(source);
        Self {
            kind: report.kind,
            bitrate_kbps: report.bitrate_kbps,
            playlist: file_name_of(&report.playlist_path),
            segment_count: report.segment_count,
            duration_secs: report.duration_secs,
            source: (!source_name.is_empty()).then_some(source_name),
            created_at: Utc::now(),
        }
    }

    /// `hls_mp3_320.m3u8` -> `hls_mp3_320.variant.json`
    pub fn path_for(playlist_path: &Path) -> PathBuf {
        let stem = playlist_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        playlist_path.with_file_name(format!("{}{}", stem, MANIFEST_SUFFIX))
    }

    /// Write the manifest into `dir`, returning its path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = Self::path_for(&dir.join(&self.playlist));
        let json = serde_json::to_string_pretty(self).map_err(|e| HlsError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| HlsError::Manifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HlsError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| HlsError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Read every manifest directly inside `dir`.
///
/// Unreadable or malformed manifests are logged and skipped.
pub fn read_manifests(dir: &Path) -> Result<Vec<VariantManifest>> {
    let mut manifests = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(MANIFEST_SUFFIX) {
            continue;
        }
        match VariantManifest::read(&entry.path()) {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => tracing::warn!("Skipping manifest: {}", e),
        }
    }
    Ok(manifests)
}
