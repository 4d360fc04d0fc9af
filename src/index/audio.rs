//! Audio stream location and analysis

use ffmpeg_next as ffmpeg;

use crate::error::{HlsError, Result};
use crate::ffmpeg_utils::context::InputContext;
use crate::ffmpeg_utils::helpers::{
    codec_params_bit_rate, codec_params_channels, codec_params_sample_rate,
};

/// Metadata of the audio stream selected for segmentation
#[derive(Debug, Clone)]
pub struct AudioStreamInfo {
    /// Zero-based index of this stream in the source file
    pub stream_index: usize,
    /// FFmpeg codec name (e.g. `mp3`, `flac`)
    pub codec_name: String,
    /// Sampling rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: u16,
    /// Declared bitrate in bits per second, 0 when the container omits it
    pub bitrate: u64,
}

/// Find the first audio stream in container order.
///
/// Only the first match is used; later audio streams are ignored.
pub fn find_audio_stream(input: &InputContext) -> Result<usize> {
    for stream in input.streams() {
        crate::ffmpeg_utils::utils::debug_stream_info(&stream, stream.index());
        if stream.parameters().medium() == ffmpeg::media::Type::Audio {
            return Ok(stream.index());
        }
    }
    Err(HlsError::NoAudioStream(input.source_path().to_path_buf()))
}

/// Analyze an audio stream and extract metadata
pub fn analyze_audio_stream(stream: &ffmpeg::Stream, index: usize) -> AudioStreamInfo {
    let params = stream.parameters();

    AudioStreamInfo {
        stream_index: index,
        codec_name: params.id().name().to_string(),
        sample_rate: codec_params_sample_rate(&params),
        channels: codec_params_channels(&params),
        bitrate: codec_params_bit_rate(&params),
    }
}
