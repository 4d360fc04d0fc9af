//! Lossy variant: MPEG-TS segments
//!
//! Packets are copied without re-encoding. The target bitrate is written to
//! the output stream's declared `bit_rate` only; the samples keep whatever
//! bitrate the source was encoded at.

use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::ffmpeg_utils::helpers;
use crate::index::AudioStreamInfo;

use super::muxer::MuxerOptions;
use super::remux::{base_options, encode_variant, MuxerProfile};
use super::{CodecKind, VariantOutput, VariantReport};

/// MPEG-TS segmenting with a declared (metadata-only) bitrate
#[derive(Debug, Default, Clone, Copy)]
pub struct LossyProfile;

impl MuxerProfile for LossyProfile {
    fn kind(&self) -> CodecKind {
        CodecKind::Lossy
    }

    fn muxer_options(&self, variant: &VariantOutput, config: &SegmenterConfig) -> MuxerOptions {
        base_options(variant, config)
    }

    fn prepare_stream(
        &self,
        stream: &mut ffmpeg::format::stream::StreamMut,
        variant: &VariantOutput,
        source: &AudioStreamInfo,
    ) {
        let Some(target_kbps) = variant.target_bitrate_kbps else {
            return;
        };
        let declared_bps = i64::from(target_kbps) * 1000;

        if source.bitrate > 0 && source.bitrate != declared_bps as u64 {
            tracing::warn!(
                "Declaring {} kbps on {:?} but the source stream is {} kbps; samples are copied, not re-encoded",
                target_kbps,
                variant.playlist_path,
                source.bitrate / 1000
            );
        }

        helpers::stream_set_bit_rate(stream, declared_bps);
        tracing::debug!(
            "Declared bit_rate {} on output stream {}",
            helpers::stream_bit_rate(stream),
            stream.index()
        );
    }
}

/// Segment `input` into MPEG-TS segments and a playlist described by `variant`.
///
/// `variant.target_bitrate_kbps` is declared on the output stream as
/// container metadata; it does not change the encoded bitrate.
pub fn encode_lossy_variant(
    input: &Path,
    variant: &VariantOutput,
    config: &SegmenterConfig,
) -> Result<VariantReport> {
    encode_variant(input, variant, &LossyProfile, config)
}
