//! Source bitrate probing
//!
//! The probed value names the lossy variant and is declared on its stream.
//! It is never used to drive an encoder.

use std::path::{Path, PathBuf};

use crate::error::{HlsError, Result};
use crate::ffmpeg_utils::context::InputContext;
use crate::ffmpeg_utils::helpers::codec_params_bit_rate;
use crate::index::find_audio_stream;

/// Reports the bitrate of a source file in kbps
pub trait BitrateProber {
    fn probe(&self, path: &Path) -> Result<u32>;
}

/// Reads the bitrate from the container through FFmpeg.
///
/// Falls back to the audio stream's declared bitrate and then to the
/// file size over the container duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBitrateProber;

impl BitrateProber for FfmpegBitrateProber {
    fn probe(&self, path: &Path) -> Result<u32> {
        let input = InputContext::open(path)?;

        let mut bps = input.bitrate();
        if bps == 0 {
            if let Ok(index) = find_audio_stream(&input) {
                if let Some(stream) = input.stream(index) {
                    bps = codec_params_bit_rate(&stream.parameters());
                }
            }
        }
        if bps == 0 {
            let duration = input.duration();
            let size = std::fs::metadata(path)?.len();
            if duration > 0.0 {
                bps = (size as f64 * 8.0 / duration) as u64;
            }
        }

        let kbps = bps_to_kbps(bps).ok_or_else(|| probe_error(path, "bitrate is unknown"))?;
        tracing::debug!("Found bitrate: {} kbps for {:?}", kbps, path);
        Ok(kbps)
    }
}

/// Always reports the same bitrate; used when the caller already knows it
#[derive(Debug, Clone, Copy)]
pub struct FixedBitrate(pub u32);

impl BitrateProber for FixedBitrate {
    fn probe(&self, path: &Path) -> Result<u32> {
        if self.0 == 0 {
            return Err(probe_error(path, "fixed bitrate must be positive"));
        }
        Ok(self.0)
    }
}

/// Convert bits per second to whole kbps, `None` below 1 kbps
pub fn bps_to_kbps(bps: u64) -> Option<u32> {
    let kbps = u32::try_from(bps / 1000).ok()?;
    (kbps > 0).then_some(kbps)
}

fn probe_error(path: &Path, reason: &str) -> HlsError {
    HlsError::Probe {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bps_to_kbps() {
        assert_eq!(bps_to_kbps(320_000), Some(320));
        assert_eq!(bps_to_kbps(128_999), Some(128));
        assert_eq!(bps_to_kbps(999), None);
        assert_eq!(bps_to_kbps(0), None);
    }

    #[test]
    fn test_fixed_bitrate() {
        let path = Path::new("song.mp3");
        assert_eq!(FixedBitrate(256).probe(path).unwrap(), 256);
        assert!(matches!(
            FixedBitrate(0).probe(path),
            Err(HlsError::Probe { .. })
        ));
    }

    #[test]
    fn test_probe_missing_file() {
        crate::ffmpeg_utils::init().unwrap();
        assert!(FfmpegBitrateProber
            .probe(Path::new("/nonexistent/song.mp3"))
            .is_err());
    }
}
