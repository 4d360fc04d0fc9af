//! Segment generation module
//!
//! Remuxes one audio stream into one HLS variant on disk using FFmpeg's
//! `hls` muxer. Two codec paths share a single pipeline:
//! - lossy: MPEG-TS segments, bitrate embedded in every file name
//! - lossless: fMP4 segments carrying FLAC, VOD playlist

pub mod lossless;
pub mod lossy;
pub mod muxer;
pub mod remux;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::index::AudioStreamInfo;

pub use lossless::encode_lossless_variant;
pub use lossy::encode_lossy_variant;

/// Which of the two segmenting pipelines produces a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Lossy,
    Lossless,
}

impl CodecKind {
    pub fn from_lossless(lossless: bool) -> Self {
        if lossless {
            CodecKind::Lossless
        } else {
            CodecKind::Lossy
        }
    }

    /// Codec prefix used in playlist and segment file names
    pub fn prefix(self) -> &'static str {
        match self {
            CodecKind::Lossy => "mp3",
            CodecKind::Lossless => "flac",
        }
    }

    /// CODECS attribute advertised in the master playlist.
    ///
    /// Fixed per path; the actual source codec is not inspected.
    pub fn codec_tag(self) -> &'static str {
        match self {
            CodecKind::Lossy => "mp4a.40.2",
            CodecKind::Lossless => "fLaC",
        }
    }

    /// Segment file extension
    pub fn segment_extension(self) -> &'static str {
        match self {
            CodecKind::Lossy => "ts",
            CodecKind::Lossless => "m4s",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Lossy => f.write_str("lossy"),
            CodecKind::Lossless => f.write_str("lossless"),
        }
    }
}

/// Variant playlist file name, e.g. `hls_mp3_320.m3u8`
pub fn playlist_filename(kind: CodecKind, bitrate_kbps: u32) -> String {
    format!("hls_{}_{}.m3u8", kind.prefix(), bitrate_kbps)
}

/// Segment file name pattern handed to the muxer (`%d` is the sequence).
///
/// Lossless segments carry no bitrate: `hls_flac_%d.m4s`.
pub fn segment_pattern(kind: CodecKind, bitrate_kbps: u32) -> String {
    match kind {
        CodecKind::Lossy => format!(
            "hls_{}_{}_%d.{}",
            kind.prefix(),
            bitrate_kbps,
            kind.segment_extension()
        ),
        CodecKind::Lossless => format!("hls_{}_%d.{}", kind.prefix(), kind.segment_extension()),
    }
}

/// An input file and its probed bitrate, owned by the caller for one encode
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub path: PathBuf,
    pub bitrate_kbps: u32,
}

/// Where and how one variant is written
#[derive(Debug, Clone)]
pub struct VariantOutput {
    pub output_dir: PathBuf,
    pub kind: CodecKind,
    /// Bitrate used for naming the variant
    pub bitrate_kbps: u32,
    /// Bitrate declared on the output stream; lossy only
    pub target_bitrate_kbps: Option<u32>,
    /// Full path of the segment pattern, including `%d`
    pub segment_template: PathBuf,
    pub playlist_path: PathBuf,
}

impl VariantOutput {
    pub fn lossy(output_dir: impl Into<PathBuf>, bitrate_kbps: u32) -> Self {
        Self::build(output_dir.into(), CodecKind::Lossy, bitrate_kbps, Some(bitrate_kbps))
    }

    pub fn lossless(output_dir: impl Into<PathBuf>, source_bitrate_kbps: u32) -> Self {
        Self::build(output_dir.into(), CodecKind::Lossless, source_bitrate_kbps, None)
    }

    pub fn for_source(
        output_dir: impl Into<PathBuf>,
        source: &MediaSource,
        kind: CodecKind,
    ) -> Self {
        match kind {
            CodecKind::Lossy => Self::lossy(output_dir, source.bitrate_kbps),
            CodecKind::Lossless => Self::lossless(output_dir, source.bitrate_kbps),
        }
    }

    fn build(
        output_dir: PathBuf,
        kind: CodecKind,
        bitrate_kbps: u32,
        target_bitrate_kbps: Option<u32>,
    ) -> Self {
        let dir = if output_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            output_dir
        };
        Self {
            segment_template: dir.join(segment_pattern(kind, bitrate_kbps)),
            playlist_path: dir.join(playlist_filename(kind, bitrate_kbps)),
            output_dir: dir,
            kind,
            bitrate_kbps,
            target_bitrate_kbps,
        }
    }

    /// File name of the playlist without its directory
    pub fn playlist_name(&self) -> String {
        file_name_of(&self.playlist_path)
    }
}

/// Progress of one variant encode.
///
/// Any failure jumps straight to `Closed`; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeState {
    Idle,
    InputOpened,
    StreamInfoLoaded,
    AudioStreamFound,
    OutputContextBuilt,
    HeaderWritten,
    Streaming,
    TrailerWritten,
    Closed,
}

impl fmt::Display for EncodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a successful encode produced
#[derive(Debug, Clone)]
pub struct VariantReport {
    pub kind: CodecKind,
    pub playlist_path: PathBuf,
    pub bitrate_kbps: u32,
    /// Container format of the source (e.g. `mp3`, `flac`)
    pub source_format: String,
    pub audio: AudioStreamInfo,
    pub packets_written: u64,
    pub segment_count: usize,
    pub duration_secs: f64,
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
