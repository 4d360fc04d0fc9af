//! End-to-end tests: synthetic source -> variant on disk -> master playlist

use std::path::Path;

use tempfile::tempdir;

use crate::config::SegmenterConfig;
use crate::error::{FfmpegError, HlsError};
use crate::ffmpeg_utils::context::InputContext;
use crate::index::find_audio_stream;
use crate::playlist::{VariantManifest, VariantPlaylist};
use crate::probe::{BitrateProber, FfmpegBitrateProber, FixedBitrate};
use crate::segment::muxer::HlsMuxer;
use crate::segment::remux::base_options;
use crate::segment::{encode_lossy_variant, CodecKind, VariantOutput};
use crate::segmenter::HlsSegmenter;
use crate::tests::fixtures::{
    files_with_extension, playlists_in, write_aac_sine, write_empty, write_flac_sine,
    write_subtitle_only,
};

const SOURCE_SECS: u32 = 25;

fn segmenter_with(kbps: u32) -> HlsSegmenter {
    HlsSegmenter::with_prober(SegmenterConfig::default(), Box::new(FixedBitrate(kbps)))
        .unwrap()
}

fn read_playlist(path: &Path) -> VariantPlaylist {
    VariantPlaylist::read(path).unwrap()
}

#[test]
fn test_lossy_playlist_name_embeds_probed_bitrate() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), SOURCE_SECS) else {
        return;
    };
    let kbps = FfmpegBitrateProber.probe(&source).unwrap();
    assert!(kbps > 0);

    let out = tempdir().unwrap();
    let segmenter = HlsSegmenter::new(SegmenterConfig::default()).unwrap();
    assert!(segmenter.segment_file(&source, out.path(), false));

    let playlist = out.path().join(format!("hls_mp3_{}.m3u8", kbps));
    assert!(playlist.is_file(), "missing {:?}", playlist);
    let segments = files_with_extension(out.path(), "ts");
    assert!(!segments.is_empty());
    let prefix = format!("hls_mp3_{}_", kbps);
    assert!(segments.iter().all(|s| s.starts_with(&prefix)));
}

#[test]
fn test_lossy_durations_cover_source() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), SOURCE_SECS) else {
        return;
    };
    let out = tempdir().unwrap();

    let report = segmenter_with(192)
        .try_segment_file(&source, out.path(), false)
        .unwrap();
    assert_eq!(report.kind, CodecKind::Lossy);
    assert_eq!(report.audio.codec_name, "aac");
    assert_eq!(report.source_format, "aac");
    assert!(report.packets_written > 0);

    let playlist = read_playlist(&report.playlist_path);
    assert_eq!(playlist.segments.len(), report.segment_count);
    assert!(playlist.segments.len() >= 3);
    assert!(playlist.ended);
    assert!(playlist.max_segment_duration() < 11.0);
    let total = playlist.total_duration();
    assert!(
        (total - f64::from(SOURCE_SECS)).abs() <= 10.0,
        "segments sum to {}s",
        total
    );
    for segment in &playlist.segments {
        assert!(out.path().join(&segment.uri).is_file());
    }
}

#[test]
fn test_non_audio_input_creates_no_playlist() {
    let dir = tempdir().unwrap();
    let source = write_subtitle_only(dir.path());
    let out = dir.path().join("out");

    let err = encode_lossy_variant(
        &source,
        &VariantOutput::lossy(&out, 128),
        &SegmenterConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, HlsError::NoAudioStream(_)));
    assert!(playlists_in(&out).is_empty());
    assert!(!segmenter_with(128).segment_file(&source, &out, false));
}

#[test]
fn test_empty_input_creates_no_playlist() {
    let dir = tempdir().unwrap();
    let source = write_empty(dir.path());

    crate::ffmpeg_utils::init().unwrap();
    let err = encode_lossy_variant(
        &source,
        &VariantOutput::lossy(dir.path(), 128),
        &SegmenterConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        HlsError::Ffmpeg(FfmpegError::OpenInput(_))
            | HlsError::Ffmpeg(FfmpegError::FindStreamInfo(_))
    ));
    assert!(!segmenter_with(128).segment_file(&source, dir.path(), true));
    assert!(playlists_in(dir.path()).is_empty());
}

#[test]
fn test_second_run_overwrites_without_detection() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), SOURCE_SECS) else {
        return;
    };
    let out = tempdir().unwrap();
    let segmenter = segmenter_with(128);

    let first = segmenter.try_segment_file(&source, out.path(), false).unwrap();
    let segments_after_first = files_with_extension(out.path(), "ts");
    let second = segmenter.try_segment_file(&source, out.path(), false).unwrap();

    assert_eq!(first.playlist_path, second.playlist_path);
    assert_eq!(first.segment_count, second.segment_count);
    assert_eq!(files_with_extension(out.path(), "ts"), segments_after_first);
    assert_eq!(playlists_in(out.path()), vec!["hls_mp3_128.m3u8".to_string()]);
}

#[test]
fn test_lossless_fmp4_variant() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_flac_sine(src_dir.path(), SOURCE_SECS) else {
        return;
    };
    let out = tempdir().unwrap();

    let report = segmenter_with(900)
        .try_segment_file(&source, out.path(), true)
        .unwrap();
    assert_eq!(report.kind, CodecKind::Lossless);
    assert_eq!(report.playlist_path, out.path().join("hls_flac_900.m3u8"));
    assert_eq!(report.audio.codec_name, "flac");
    assert_eq!(report.source_format, "flac");

    let segments = files_with_extension(out.path(), "m4s");
    assert!(!segments.is_empty());
    assert!(segments.iter().all(|s| s.starts_with("hls_flac_")));

    let playlist = read_playlist(&report.playlist_path);
    assert_eq!(playlist.playlist_type.as_deref(), Some("VOD"));
    assert!(playlist.init_uri.is_some());

    let manifest =
        VariantManifest::read(&out.path().join("hls_flac_900.variant.json")).unwrap();
    assert_eq!(manifest.kind, CodecKind::Lossless);
    assert_eq!(manifest.bitrate_kbps, 900);
    assert_eq!(manifest.segment_count, report.segment_count);
    assert_eq!(manifest.source.as_deref(), Some("sine.flac"));

    // The muxer's own master playlist is off by default
    assert!(!out.path().join("master.m3u8").exists());
}

#[test]
fn test_master_over_lossy_variants() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), 12) else {
        return;
    };
    let out = tempdir().unwrap();

    assert!(segmenter_with(320).segment_file(&source, out.path(), false));
    assert!(segmenter_with(128).segment_file(&source, out.path(), false));

    let segmenter = segmenter_with(128);
    let master_path = segmenter
        .try_build_master_playlist(out.path(), out.path(), false)
        .unwrap();
    let master = std::fs::read_to_string(master_path).unwrap();

    assert!(master.starts_with("#EXTM3U\n"));
    let low = master.find("BANDWIDTH=128,CODECS=\"mp4a.40.2\"").unwrap();
    let high = master.find("BANDWIDTH=320,CODECS=\"mp4a.40.2\"").unwrap();
    assert!(low < high);
    assert!(master.contains("\nhls_mp3_128.m3u8\n"));
    assert!(master.contains("\nhls_mp3_320.m3u8\n"));

    // No lossless variants in this directory
    assert!(!segmenter.build_master_playlist(out.path(), &out.path().join("flac"), true));
}

#[test]
fn test_master_over_lossless_variant() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_flac_sine(src_dir.path(), 12) else {
        return;
    };
    let out = tempdir().unwrap();
    let segmenter = segmenter_with(870);

    assert!(segmenter.segment_file(&source, out.path(), true));
    assert!(segmenter.build_master_playlist(out.path(), out.path(), true));

    let master = std::fs::read_to_string(out.path().join("master.m3u8")).unwrap();
    assert_eq!(
        master,
        "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=870,CODECS=\"fLaC\"\nhls_flac_870.m3u8\n"
    );
}

#[test]
fn test_unwritable_segments_fail_after_output_built() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), 12) else {
        return;
    };
    let out = tempdir().unwrap();
    // A regular file where the segment directory should be
    let blocked = out.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let mut variant = VariantOutput::lossy(out.path(), 128);
    variant.segment_template = blocked.join("hls_mp3_128_%d.ts");

    let err = encode_lossy_variant(&source, &variant, &SegmenterConfig::default()).unwrap_err();
    assert!(
        matches!(
            err,
            HlsError::Ffmpeg(
                FfmpegError::WriteHeader(_)
                    | FfmpegError::WritePacket(_)
                    | FfmpegError::WriteTrailer(_)
            )
        ),
        "unexpected error {:?}",
        err
    );
    assert!(files_with_extension(out.path(), "ts").is_empty());
}

#[test]
fn test_blocked_first_segment_reports_false() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), 12) else {
        return;
    };
    let out = tempdir().unwrap();
    std::fs::create_dir(out.path().join("hls_mp3_128_0.ts")).unwrap();

    assert!(!segmenter_with(128).segment_file(&source, out.path(), false));
    assert!(!out.path().join("hls_mp3_128.variant.json").exists());
}

#[test]
fn test_dropped_muxer_finishes_playlist() {
    let src_dir = tempdir().unwrap();
    let Some(source) = write_aac_sine(src_dir.path(), 4) else {
        return;
    };
    let out = tempdir().unwrap();
    let variant = VariantOutput::lossy(out.path(), 128);

    let mut input = InputContext::open(&source).unwrap();
    let audio_index = find_audio_stream(&input).unwrap();
    let (params, in_tb) = {
        let stream = input.stream(audio_index).unwrap();
        (stream.parameters(), stream.time_base())
    };

    {
        let mut muxer = HlsMuxer::create(&variant.playlist_path).unwrap();
        let out_index = muxer.add_stream_copy(&params).unwrap();
        muxer
            .write_header(&base_options(&variant, &SegmenterConfig::default()))
            .unwrap();
        let out_tb = muxer.time_base(out_index).unwrap();

        for (stream, mut packet) in input.inner_mut().packets() {
            if stream.index() != audio_index {
                continue;
            }
            packet.set_stream(out_index);
            packet.rescale_ts(in_tb, out_tb);
            packet.set_position(-1);
            muxer.write_packet(&mut packet).unwrap();
        }
        assert!(muxer.header_written());
        // dropped here without write_trailer
    }

    let playlist = read_playlist(&variant.playlist_path);
    assert!(playlist.ended);
    assert!(!playlist.segments.is_empty());
    for segment in &playlist.segments {
        assert!(out.path().join(&segment.uri).is_file());
    }
}
