use std::path::PathBuf;

use thiserror::Error;

/// Errors of the segmenter and the master playlist assembler
#[derive(Error, Debug)]
pub enum HlsError {
    /// FFmpeg reported a failure
    #[error("FFmpeg: {0}")]
    Ffmpeg(#[from] FfmpegError),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The source container has no audio stream to segment
    #[error("No audio stream found in {0}")]
    NoAudioStream(PathBuf),

    /// The bitrate of the source could not be determined
    #[error("Bitrate probe failed for {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// A master playlist was requested but no variant playlists were found
    #[error("No playlists found in directory: {0}")]
    NoPlaylistsFound(PathBuf),

    /// The master playlist could not be written
    #[error("Failed to write playlist {path}: {source}")]
    PlaylistWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sidecar variant manifest could not be read or written
    #[error("Variant manifest error for {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// Invalid or unreadable segmenter configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Failures reported by FFmpeg while opening, remuxing or writing a variant
#[derive(Error, Debug)]
pub enum FfmpegError {
    /// One-time library initialization failed
    #[error("FFmpeg init failed: {0}")]
    InitFailed(String),

    /// The source could not be opened
    #[error("Cannot open input: {0}")]
    OpenInput(String),

    /// The source opened but its streams could not be identified
    #[error("Cannot read stream info: {0}")]
    FindStreamInfo(String),

    /// The `hls` output context could not be allocated
    #[error("Cannot allocate HLS output: {0}")]
    MuxerCreate(String),

    /// The destination stream could not be created
    #[error("Cannot create output stream: {0}")]
    StreamConfig(String),

    #[error("Cannot copy codec parameters: {0}")]
    CodecParameterCopy(String),

    #[error("Header write failed: {0}")]
    WriteHeader(String),

    /// A frame could not be written; the variant is left as written so far
    #[error("Frame write failed: {0}")]
    WritePacket(String),

    #[error("Trailer write failed: {0}")]
    WriteTrailer(String),
}

pub type Result<T> = std::result::Result<T, HlsError>;
