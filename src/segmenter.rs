//! Segmenter facade
//!
//! `HlsSegmenter` ties the prober, the two variant encoders and the master
//! assembler together. The `try_*` methods return typed errors; the plain
//! methods are the boolean boundary used by callers that only need to know
//! whether the operation succeeded.

use std::path::{Path, PathBuf};

use crate::config::SegmenterConfig;
use crate::error::Result;
use crate::ffmpeg_utils;
use crate::playlist::{write_master_playlist, VariantManifest};
use crate::probe::{BitrateProber, FfmpegBitrateProber};
use crate::segment::{
    encode_lossless_variant, encode_lossy_variant, CodecKind, MediaSource, VariantOutput,
    VariantReport,
};

pub struct HlsSegmenter {
    config: SegmenterConfig,
    prober: Box<dyn BitrateProber>,
}

impl HlsSegmenter {
    /// Validate `config` and make sure FFmpeg is initialized for this process
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        Self::with_prober(config, Box::new(FfmpegBitrateProber))
    }

    pub fn with_prober(config: SegmenterConfig, prober: Box<dyn BitrateProber>) -> Result<Self> {
        config.validate()?;
        ffmpeg_utils::init()?;
        Ok(Self { config, prober })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Bitrate of `input` in kbps, as reported by the configured prober
    pub fn probe_bitrate(&self, input: &Path) -> Result<u32> {
        self.prober.probe(input)
    }

    /// Write one variant of `input` into `output_dir`
    pub fn try_segment_file(
        &self,
        input: &Path,
        output_dir: &Path,
        lossless: bool,
    ) -> Result<VariantReport> {
        let source = MediaSource {
            path: input.to_path_buf(),
            bitrate_kbps: self.prober.probe(input)?,
        };
        let kind = CodecKind::from_lossless(lossless);
        let variant = VariantOutput::for_source(output_dir, &source, kind);

        tracing::debug!(
            "Segmenting {:?} ({} kbps) as {} variant into {:?}",
            source.path,
            source.bitrate_kbps,
            kind,
            variant.output_dir
        );

        let report = match kind {
            CodecKind::Lossy => encode_lossy_variant(&source.path, &variant, &self.config)?,
            CodecKind::Lossless => encode_lossless_variant(&source.path, &variant, &self.config)?,
        };

        if self.config.write_manifest {
            let manifest = VariantManifest::from_report(&report, &source.path);
            let manifest_path = manifest.write(&variant.output_dir)?;
            tracing::debug!("Wrote variant manifest {:?}", manifest_path);
        }

        tracing::info!(
            "Created {} variant {:?} from {} source: {} segments, {:.2}s",
            report.kind,
            report.playlist_path,
            report.source_format,
            report.segment_count,
            report.duration_secs
        );
        Ok(report)
    }

    /// Write one variant of `input` into `output_dir`; failures are logged
    pub fn segment_file(&self, input: &Path, output_dir: &Path, lossless: bool) -> bool {
        match self.try_segment_file(input, output_dir, lossless) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Segmenting {:?} failed: {}", input, e);
                false
            }
        }
    }

    /// Assemble the master playlist for the variants found in `variant_dir`
    pub fn try_build_master_playlist(
        &self,
        variant_dir: &Path,
        output_dir: &Path,
        lossless: bool,
    ) -> Result<PathBuf> {
        write_master_playlist(variant_dir, output_dir, lossless, &self.config.master)
    }

    /// Assemble the master playlist; failures are logged
    pub fn build_master_playlist(
        &self,
        variant_dir: &Path,
        output_dir: &Path,
        lossless: bool,
    ) -> bool {
        match self.try_build_master_playlist(variant_dir, output_dir, lossless) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Building master playlist from {:?} failed: {}", variant_dir, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HlsError;
    use crate::probe::FixedBitrate;
    use tempfile::tempdir;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SegmenterConfig::default();
        config.segment.target_duration_secs = 0;
        assert!(matches!(
            HlsSegmenter::new(config),
            Err(HlsError::Config(_))
        ));
    }

    #[test]
    fn test_many_instances_share_init() {
        let a = HlsSegmenter::new(SegmenterConfig::default()).unwrap();
        let b = HlsSegmenter::new(SegmenterConfig::default()).unwrap();
        drop(a);
        assert_eq!(b.config().master.filename, "master.m3u8");
    }

    #[test]
    fn test_segment_missing_file_reports_false() {
        let dir = tempdir().unwrap();
        let segmenter =
            HlsSegmenter::with_prober(SegmenterConfig::default(), Box::new(FixedBitrate(128)))
                .unwrap();
        assert!(!segmenter.segment_file(
            &dir.path().join("missing.mp3"),
            dir.path(),
            false
        ));
    }

    #[test]
    fn test_master_on_empty_dir_reports_false() {
        let dir = tempdir().unwrap();
        let segmenter = HlsSegmenter::new(SegmenterConfig::default()).unwrap();
        assert!(!segmenter.build_master_playlist(dir.path(), dir.path(), true));
        assert!(!dir.path().join("master.m3u8").exists());
    }

    #[test]
    fn test_master_from_names_reports_true() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("hls_mp3_128.m3u8"), "#EXTM3U\n").unwrap();
        std::fs::write(dir.path().join("hls_mp3_320.m3u8"), "#EXTM3U\n").unwrap();

        let segmenter = HlsSegmenter::new(SegmenterConfig::default()).unwrap();
        assert!(segmenter.build_master_playlist(dir.path(), dir.path(), false));

        let master = std::fs::read_to_string(dir.path().join("master.m3u8")).unwrap();
        assert!(master.contains("BANDWIDTH=128,"));
        assert!(master.contains("BANDWIDTH=320,"));
    }
}
