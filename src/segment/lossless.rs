//! Lossless variant: fragmented MP4 segments
//!
//! FLAC packets are copied into fMP4 fragments under a VOD playlist. The
//! master playlist normally comes from the assembler; the muxer only writes
//! its own when `lossless.muxer_master_name` is configured.

use std::path::Path;

use crate::config::SegmenterConfig;
use crate::error::Result;

use super::muxer::MuxerOptions;
use super::remux::{base_options, encode_variant, MuxerProfile};
use super::{CodecKind, VariantOutput, VariantReport};

#[derive(Debug, Default, Clone, Copy)]
pub struct LosslessProfile;

impl MuxerProfile for LosslessProfile {
    fn kind(&self) -> CodecKind {
        CodecKind::Lossless
    }

    fn muxer_options(&self, variant: &VariantOutput, config: &SegmenterConfig) -> MuxerOptions {
        let mut opts = base_options(variant, config);
        opts.set("hls_segment_type", "fmp4");
        opts.set("hls_playlist_type", "vod");
        opts.set("hls_fmp4_init_filename", config.lossless.init_filename.as_str());
        if let Some(name) = &config.lossless.muxer_master_name {
            opts.set("master_pl_name", name.as_str());
        }
        opts
    }
}

/// Segment `input` into fMP4 segments and a VOD playlist described by `variant`
pub fn encode_lossless_variant(
    input: &Path,
    variant: &VariantOutput,
    config: &SegmenterConfig,
) -> Result<VariantReport> {
    encode_variant(input, variant, &LosslessProfile, config)
}
