//! FFmpeg input context wrapper

use std::path::{Path, PathBuf};
use std::ptr;

use ffmpeg_next as ffmpeg;

use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::helpers;

/// Wrapper for an FFmpeg input context whose stream info has been loaded.
///
/// The demuxer handle is released when the wrapper is dropped.
pub struct InputContext {
    inner: ffmpeg::format::context::Input,
    source_path: PathBuf,
}

impl InputContext {
    /// Open a media file and read its stream information.
    ///
    /// Opening and stream probing are separate steps so callers can tell an
    /// unreadable file from one whose streams cannot be identified.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let c_path = helpers::path_to_cstring(path).ok_or_else(|| {
            FfmpegError::OpenInput(format!("{:?}: path contains a NUL byte", path))
        })?;

        let mut ctx: *mut ffmpeg::ffi::AVFormatContext = ptr::null_mut();

        // SAFETY: `ctx` starts null and is only used after a successful open.
        // On failure avformat_open_input frees whatever it allocated and
        // leaves `ctx` null; on stream-info failure we close it ourselves.
        unsafe {
            let ret = ffmpeg::ffi::avformat_open_input(
                &mut ctx,
                c_path.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            );
            if ret < 0 {
                return Err(FfmpegError::OpenInput(format!(
                    "Failed to open {:?}: {}",
                    path,
                    ffmpeg::Error::from(ret)
                ))
                .into());
            }

            let ret = ffmpeg::ffi::avformat_find_stream_info(ctx, ptr::null_mut());
            if ret < 0 {
                ffmpeg::ffi::avformat_close_input(&mut ctx);
                return Err(FfmpegError::FindStreamInfo(format!(
                    "{:?}: {}",
                    path,
                    ffmpeg::Error::from(ret)
                ))
                .into());
            }

            tracing::debug!("Opened input file: {:?}", path);

            Ok(Self {
                inner: ffmpeg::format::context::Input::wrap(ctx),
                source_path: path.to_path_buf(),
            })
        }
    }

    /// Get the source file path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Short name of the detected container format (e.g. `mp3`, `flac`)
    pub fn format_name(&self) -> String {
        self.inner.format().name().to_string()
    }

    /// Get the duration of the media in seconds
    pub fn duration(&self) -> f64 {
        let duration = self.inner.duration();
        if duration <= 0 {
            return 0.0;
        }
        duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
    }

    /// Container-level bitrate in bits per second, 0 when unknown
    pub fn bitrate(&self) -> u64 {
        self.inner.bit_rate().max(0) as u64
    }

    /// Get a stream by index
    pub fn stream(&self, index: usize) -> Option<ffmpeg::Stream<'_>> {
        self.inner.stream(index)
    }

    /// Iterate over all streams in container order
    pub fn streams(&self) -> impl Iterator<Item = ffmpeg::Stream<'_>> + '_ {
        self.inner.streams().into_iter()
    }

    /// Mutable access for packet reading
    pub fn inner_mut(&mut self) -> &mut ffmpeg::format::context::Input {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HlsError;

    #[test]
    fn test_open_missing_file() {
        crate::ffmpeg_utils::init().unwrap();
        let result = InputContext::open("/nonexistent/input.flac");
        assert!(matches!(
            result,
            Err(HlsError::Ffmpeg(FfmpegError::OpenInput(_)))
        ));
    }

    #[test]
    fn test_open_empty_file() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp3");
        std::fs::write(&path, b"").unwrap();

        assert!(InputContext::open(&path).is_err());
    }
}
