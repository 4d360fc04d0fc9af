//! Timestamp conversion between stream timebases

use ffmpeg_next as ffmpeg;
use ffmpeg_next::Rescale;

/// Convert a timestamp from one timebase to another, rounding to nearest.
///
/// Used for every pts/dts/duration copied from the source stream to the
/// segmented output, whose timebase is chosen by the muxer.
pub fn rescale_ts(ts: i64, from: ffmpeg::Rational, to: ffmpeg::Rational) -> i64 {
    ts.rescale_with(from, to, ffmpeg::Rounding::NearestInfinity)
}

/// Rescale an optional timestamp; unset timestamps stay unset.
pub fn rescale_opt_ts(
    ts: Option<i64>,
    from: ffmpeg::Rational,
    to: ffmpeg::Rational,
) -> Option<i64> {
    ts.map(|t| rescale_ts(t, from, to))
}

/// Timestamp in seconds; 0 for a degenerate timebase
pub fn pts_to_seconds(pts: i64, timebase: ffmpeg::Rational) -> f64 {
    if timebase.denominator() == 0 {
        return 0.0;
    }
    pts as f64 * f64::from(timebase)
}

/// Log one input stream while the audio stream is being located
pub fn debug_stream_info(stream: &ffmpeg::Stream, index: usize) {
    let params = stream.parameters();
    tracing::debug!(
        "Input stream {}: {:?} {} in {}",
        index,
        params.medium(),
        params.id().name(),
        stream.time_base()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_mp3_to_mpegts() {
        // 1152-sample MP3 frame at 44.1 kHz into the 90 kHz MPEG-TS clock
        let from = ffmpeg::Rational::new(1, 44100);
        let to = ffmpeg::Rational::new(1, 90000);
        assert_eq!(rescale_ts(1152, from, to), 2351);
        assert_eq!(rescale_ts(44100, from, to), 90000);
    }

    #[test]
    fn test_rescale_rounds_to_nearest() {
        let from = ffmpeg::Rational::new(1, 3);
        let to = ffmpeg::Rational::new(1, 2);
        // 1/3 s = 0.666.. ticks of 1/2 s -> 1
        assert_eq!(rescale_ts(1, from, to), 1);
        // 2/3 s = 1.333.. ticks -> 1
        assert_eq!(rescale_ts(2, from, to), 1);
    }

    #[test]
    fn test_rescale_opt_ts_keeps_unset() {
        let from = ffmpeg::Rational::new(1, 48000);
        let to = ffmpeg::Rational::new(1, 90000);
        assert_eq!(rescale_opt_ts(None, from, to), None);
        assert_eq!(rescale_opt_ts(Some(48000), from, to), Some(90000));
    }

    #[test]
    fn test_pts_to_seconds() {
        let timebase = ffmpeg::Rational::new(1, 90000);
        assert!((pts_to_seconds(90000, timebase) - 1.0).abs() < 0.0001);
        assert!((pts_to_seconds(45000, timebase) - 0.5).abs() < 0.0001);
        assert_eq!(pts_to_seconds(10, ffmpeg::Rational::new(1, 0)), 0.0);
    }
}
