//! HLS muxer wrapper
//!
//! Owns the FFmpeg output context bound to the `hls` muxer. The `hls` format
//! opens its playlist and segment files itself, so no AVIO handle is opened
//! here; the context and anything the muxer opened are released on drop.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use ffmpeg_next as ffmpeg;

use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::helpers;

/// FFmpeg output format name of the segmenting muxer
pub const HLS_FORMAT: &str = "hls";

/// Ordered `hls` muxer private options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuxerOptions {
    entries: Vec<(String, String)>,
}

impl MuxerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing an earlier value for the same key
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_dictionary(&self) -> ffmpeg::Dictionary<'static> {
        let mut dict = ffmpeg::Dictionary::new();
        for (key, value) in self.iter() {
            dict.set(key, value);
        }
        dict
    }
}

/// Segmented HLS output for a single audio stream
pub struct HlsMuxer {
    output: ffmpeg::format::context::Output,
    playlist_path: PathBuf,
    header_written: bool,
    trailer_written: bool,
}

impl HlsMuxer {
    /// Allocate an output context targeting `playlist_path`.
    ///
    /// The output file is only opened here when the format does not open its
    /// own files (`AVFMT_NOFILE` unset); `hls` always sets it.
    pub fn create(playlist_path: &Path) -> Result<Self> {
        let alloc_error = |reason: String| {
            FfmpegError::MuxerCreate(format!(
                "Failed to allocate {} output for {:?}: {}",
                HLS_FORMAT, playlist_path, reason
            ))
        };
        let c_path = helpers::path_to_cstring(playlist_path)
            .ok_or_else(|| alloc_error("path contains a NUL byte".to_string()))?;
        let c_format =
            CString::new(HLS_FORMAT).map_err(|_| alloc_error("invalid format name".to_string()))?;

        let mut ctx: *mut ffmpeg::ffi::AVFormatContext = ptr::null_mut();

        // SAFETY: `ctx` is only wrapped after a successful allocation; the
        // wrapper frees it (and closes `pb` if opened) on drop.
        let output = unsafe {
            let ret = ffmpeg::ffi::avformat_alloc_output_context2(
                &mut ctx,
                ptr::null_mut(),
                c_format.as_ptr(),
                c_path.as_ptr(),
            );
            if ret < 0 || ctx.is_null() {
                return Err(alloc_error(ffmpeg::Error::from(ret).to_string()).into());
            }
            let output = ffmpeg::format::context::Output::wrap(ctx);

            let nofile = ffmpeg::ffi::AVFMT_NOFILE as std::ffi::c_int;
            if (*(*ctx).oformat).flags & nofile == 0 {
                let ret = ffmpeg::ffi::avio_open(
                    &mut (*ctx).pb,
                    c_path.as_ptr(),
                    ffmpeg::ffi::AVIO_FLAG_WRITE as std::ffi::c_int,
                );
                if ret < 0 {
                    return Err(alloc_error(ffmpeg::Error::from(ret).to_string()).into());
                }
            }
            output
        };

        Ok(Self {
            output,
            playlist_path: playlist_path.to_path_buf(),
            header_written: false,
            trailer_written: false,
        })
    }

    /// Add a stream carrying a verbatim copy of `params` and return its index
    pub fn add_stream_copy(
        &mut self,
        params: &ffmpeg::codec::parameters::Parameters,
    ) -> Result<usize> {
        let mut out_stream = self
            .output
            .add_stream(ffmpeg::encoder::find(ffmpeg::codec::Id::None))
            .map_err(|e| FfmpegError::StreamConfig(format!("Failed to add audio stream: {}", e)))?;

        helpers::stream_copy_parameters(&mut out_stream, params)
            .map_err(|e| FfmpegError::CodecParameterCopy(e.to_string()))?;
        // Let the segment container pick its own tag; the source's tag
        // belongs to the source container.
        helpers::stream_reset_codec_tag(&mut out_stream);

        let out_index = out_stream.index();
        tracing::debug!("Added audio stream {} to {:?}", out_index, self.playlist_path);
        Ok(out_index)
    }

    /// Mutable access to an output stream before the header is written
    pub fn stream_mut(&mut self, index: usize) -> Option<ffmpeg::format::stream::StreamMut<'_>> {
        self.output.stream_mut(index)
    }

    /// Write the container header, applying the muxer options.
    ///
    /// Options the muxer did not recognise are logged and otherwise ignored.
    pub fn write_header(&mut self, options: &MuxerOptions) -> Result<()> {
        let leftover = self
            .output
            .write_header_with(options.to_dictionary())
            .map_err(|e| {
                FfmpegError::WriteHeader(format!("{:?}: {}", self.playlist_path, e))
            })?;
        self.header_written = true;

        for (key, value) in leftover.iter() {
            tracing::warn!("hls muxer ignored option {}={}", key, value);
        }
        Ok(())
    }

    /// Timebase the muxer chose for an output stream (valid after the header)
    pub fn time_base(&self, index: usize) -> Option<ffmpeg::Rational> {
        self.output.stream(index).map(|s| s.time_base())
    }

    /// Write one packet; its stream index and timestamps must already target
    /// the output stream
    pub fn write_packet(&mut self, packet: &mut ffmpeg::Packet) -> Result<()> {
        packet
            .write_interleaved(&mut self.output)
            .map_err(|e| FfmpegError::WritePacket(e.to_string()).into())
    }

    /// Flush buffered packets, close the last segment and finish the playlist
    pub fn write_trailer(&mut self) -> Result<()> {
        if !self.header_written || self.trailer_written {
            return Ok(());
        }
        self.trailer_written = true;
        self.output.write_trailer().map_err(|e| {
            FfmpegError::WriteTrailer(format!("{:?}: {}", self.playlist_path, e)).into()
        })
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }
}

impl Drop for HlsMuxer {
    fn drop(&mut self) {
        if self.header_written && !self.trailer_written {
            if let Err(e) = self.write_trailer() {
                tracing::debug!("Trailer on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_replace_existing_key() {
        let mut opts = MuxerOptions::new();
        opts.set("hls_time", "4").set("hls_list_size", "0");
        opts.set("hls_time", "10");

        let collected: Vec<_> = opts.iter().collect();
        assert_eq!(collected, vec![("hls_time", "10"), ("hls_list_size", "0")]);
        assert_eq!(opts.get("hls_time"), Some("10"));
        assert_eq!(opts.get("hls_flags"), None);
    }

    #[test]
    fn test_options_to_dictionary() {
        let mut opts = MuxerOptions::new();
        opts.set("hls_segment_type", "fmp4");
        let dict = opts.to_dictionary();
        assert_eq!(dict.get("hls_segment_type"), Some("fmp4"));
    }

    #[test]
    fn test_create_hls_output() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let muxer = HlsMuxer::create(&dir.path().join("hls_mp3_128.m3u8")).unwrap();
        assert!(!muxer.header_written());
    }
}
