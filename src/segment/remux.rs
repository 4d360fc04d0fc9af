//! Shared remux pipeline
//!
//! Both codec paths run the same sequence: open the source, locate the audio
//! stream, build an `hls` output with one copied stream, write the header,
//! stream packets with rescaled timestamps, write the trailer. The codec
//! specific parts are supplied by a [`MuxerProfile`].
//!
//! Every resource (input context, output context, packets) is owned by the
//! pipeline's stack frame, so any early return releases them.

use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::config::SegmenterConfig;
use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::context::InputContext;
use crate::ffmpeg_utils::utils::{pts_to_seconds, rescale_opt_ts, rescale_ts};
use crate::index::audio::{analyze_audio_stream, find_audio_stream, AudioStreamInfo};
use crate::playlist::variant::VariantPlaylist;

use super::muxer::{HlsMuxer, MuxerOptions};
use super::{CodecKind, EncodeState, VariantOutput, VariantReport};

/// Codec-specific configuration of the `hls` muxer
pub trait MuxerProfile {
    fn kind(&self) -> CodecKind;

    /// Private options passed to the muxer when the header is written
    fn muxer_options(&self, variant: &VariantOutput, config: &SegmenterConfig) -> MuxerOptions;

    /// Adjust the copied output stream before the header is written
    fn prepare_stream(
        &self,
        _stream: &mut ffmpeg::format::stream::StreamMut,
        _variant: &VariantOutput,
        _source: &AudioStreamInfo,
    ) {
    }
}

/// Options common to both paths: segment length, playlist size, flags and
/// the segment file pattern
pub fn base_options(variant: &VariantOutput, config: &SegmenterConfig) -> MuxerOptions {
    let mut opts = MuxerOptions::new();
    opts.set("hls_time", config.segment.target_duration_secs.to_string());
    opts.set("hls_list_size", config.segment.playlist_size.to_string());
    if config.segment.independent_segments {
        opts.set("hls_flags", "independent_segments");
    }
    opts.set(
        "hls_segment_filename",
        variant.segment_template.to_string_lossy(),
    );
    opts
}

/// Logs every state transition of one variant encode
struct StateTracker<'a> {
    state: EncodeState,
    playlist: &'a Path,
}

impl<'a> StateTracker<'a> {
    fn new(playlist: &'a Path) -> Self {
        Self {
            state: EncodeState::Idle,
            playlist,
        }
    }

    fn advance(&mut self, next: EncodeState) {
        tracing::debug!("{:?}: {} -> {}", self.playlist, self.state, next);
        self.state = next;
    }
}

/// Run the full pipeline for one variant.
///
/// Files already written when a failure occurs are left on disk.
pub fn encode_variant(
    source: &Path,
    variant: &VariantOutput,
    profile: &dyn MuxerProfile,
    config: &SegmenterConfig,
) -> Result<VariantReport> {
    let mut tracker = StateTracker::new(&variant.playlist_path);
    let result = run_pipeline(source, variant, profile, config, &mut tracker);
    if let Err(e) = &result {
        tracing::debug!(
            "{:?}: {} variant failed in state {}: {}",
            variant.playlist_path,
            profile.kind(),
            tracker.state,
            e
        );
    }
    tracker.advance(EncodeState::Closed);
    result
}

fn run_pipeline(
    source: &Path,
    variant: &VariantOutput,
    profile: &dyn MuxerProfile,
    config: &SegmenterConfig,
    tracker: &mut StateTracker<'_>,
) -> Result<VariantReport> {
    let mut input = InputContext::open(source)?;
    tracker.advance(EncodeState::InputOpened);
    tracker.advance(EncodeState::StreamInfoLoaded);

    let audio_index = find_audio_stream(&input)?;
    let (audio, in_params, in_tb) = {
        let stream = input.stream(audio_index).ok_or_else(|| {
            FfmpegError::StreamConfig(format!("stream {} disappeared", audio_index))
        })?;
        (
            analyze_audio_stream(&stream, audio_index),
            stream.parameters(),
            stream.time_base(),
        )
    };
    tracing::debug!(
        "Selected audio stream {}: codec={}, {} Hz, {} channels",
        audio.stream_index,
        audio.codec_name,
        audio.sample_rate,
        audio.channels
    );
    tracker.advance(EncodeState::AudioStreamFound);

    std::fs::create_dir_all(&variant.output_dir)?;
    let mut muxer = HlsMuxer::create(&variant.playlist_path)?;
    let out_index = muxer.add_stream_copy(&in_params)?;
    if let Some(mut out_stream) = muxer.stream_mut(out_index) {
        profile.prepare_stream(&mut out_stream, variant, &audio);
    }
    tracker.advance(EncodeState::OutputContextBuilt);

    muxer.write_header(&profile.muxer_options(variant, config))?;
    let out_tb = muxer.time_base(out_index).ok_or_else(|| {
        FfmpegError::StreamConfig(format!("output stream {} has no timebase", out_index))
    })?;
    tracker.advance(EncodeState::HeaderWritten);

    tracker.advance(EncodeState::Streaming);
    let mut packets_written: u64 = 0;
    let mut end_ts: i64 = 0;
    let mut loop_result = Ok(());
    for (stream, mut packet) in input.inner_mut().packets() {
        if stream.index() != audio_index {
            continue;
        }

        packet.set_stream(out_index);
        packet.set_pts(rescale_opt_ts(packet.pts(), in_tb, out_tb));
        packet.set_dts(rescale_opt_ts(packet.dts(), in_tb, out_tb));
        packet.set_duration(rescale_ts(packet.duration(), in_tb, out_tb));
        packet.set_position(-1);
        if let Some(pts) = packet.pts() {
            end_ts = end_ts.max(pts + packet.duration());
        }

        if let Err(e) = muxer.write_packet(&mut packet) {
            tracing::error!("Error writing frame {}: {}", packets_written, e);
            loop_result = Err(e);
            break;
        }
        packets_written += 1;
    }
    tracing::debug!(
        "{:?}: copied {} packets, {:.3}s",
        variant.playlist_path,
        packets_written,
        pts_to_seconds(end_ts, out_tb)
    );

    // The trailer is written even after a failed write so the muxer closes
    // the segment it was filling.
    let trailer_result = muxer.write_trailer();
    tracker.advance(EncodeState::TrailerWritten);
    loop_result?;
    trailer_result?;
    drop(muxer);

    let playlist = VariantPlaylist::read(&variant.playlist_path)?;
    Ok(VariantReport {
        kind: profile.kind(),
        playlist_path: variant.playlist_path.clone(),
        bitrate_kbps: variant.bitrate_kbps,
        source_format: input.format_name(),
        audio,
        packets_written,
        segment_count: playlist.segments.len(),
        duration_secs: playlist.total_duration(),
    })
}
