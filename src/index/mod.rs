//! Stream indexing module
//!
//! Locates the audio stream to segment and extracts its metadata.

pub mod audio;

pub use audio::{find_audio_stream, AudioStreamInfo};
