//! HLS audio segmenter
//!
//! Remuxes the audio stream of a single file into an HLS variant (MPEG-TS
//! segments for lossy sources, fMP4 segments for FLAC) without re-encoding,
//! and assembles master playlists over the produced variants.

pub mod config;
pub mod config_file;
pub mod error;
pub mod ffmpeg_utils;
pub mod index;
pub mod playlist;
pub mod probe;
pub mod segment;
pub mod segmenter;

#[cfg(test)]
pub(crate) mod tests;

pub use config::SegmenterConfig;
pub use error::{FfmpegError, HlsError, Result};
pub use ffmpeg_utils::version_info as ffmpeg_version_info;
pub use ffmpeg_utils::{init, install_log_filter};
pub use probe::{BitrateProber, FfmpegBitrateProber, FixedBitrate};
pub use segment::{CodecKind, VariantReport};
pub use segmenter::HlsSegmenter;
