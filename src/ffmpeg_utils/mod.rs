//! FFmpeg module - provides wrappers and utilities for FFmpeg library access
//!
//! This module handles:
//! - Process-wide FFmpeg initialization
//! - Routing of FFmpeg's own log output into `tracing`
//! - Input context management
//! - Timebase conversion and raw codec-parameter access

pub mod context;
pub mod helpers;
pub mod utils;

use std::sync::OnceLock;

use ffmpeg_next as ffmpeg;

/// Outcome of the one-time library initialization, shared by every caller.
static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the FFmpeg library.
///
/// Safe to call any number of times from any number of segmenter instances.
/// The underlying initialization runs once per process and is never torn down.
pub fn init() -> Result<(), crate::error::FfmpegError> {
    let outcome = INIT.get_or_init(|| match ffmpeg::init() {
        Ok(()) => {
            tracing::info!("FFmpeg initialized");
            Ok(())
        }
        Err(e) => Err(format!("ffmpeg::init() failed: {}", e)),
    });

    outcome
        .clone()
        .map_err(crate::error::FfmpegError::InitFailed)
}

/// Install a custom FFmpeg log callback that forwards library messages to
/// `tracing` and drops known-noisy ones.
///
/// **Safety & Ordering:** Must be called after `init()` and before any
/// threading begins, because altering the global log callback is not
/// thread-safe.
pub fn install_log_filter() {
    // SAFETY: both functions modify global FFmpeg state and are safe to call
    // after `ffmpeg::init()`. They are called once at startup.
    unsafe {
        ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_WARNING as i32);
        ffmpeg_next::ffi::av_log_set_callback(Some(ffmpeg_log_callback));
    }
}

/// Messages the HLS muxer emits during normal operation.
const SUPPRESSED_MESSAGES: &[&str] = &[
    "Opening '",
    "Estimating duration from bitrate",
];

unsafe extern "C" fn ffmpeg_log_callback(
    avcl: *mut std::ffi::c_void,
    level: std::ffi::c_int,
    fmt: *const std::ffi::c_char,
    vl: ffmpeg_next::ffi::va_list,
) {
    use std::ffi::CStr;

    if level > unsafe { ffmpeg_next::ffi::av_log_get_level() } {
        return;
    }

    let mut buf = [0 as std::ffi::c_char; 1024];
    let mut print_prefix: std::ffi::c_int = 1;
    ffmpeg_next::ffi::av_log_format_line(
        avcl,
        level,
        fmt,
        vl,
        buf.as_mut_ptr(),
        buf.len() as std::ffi::c_int,
        &mut print_prefix,
    );

    let msg = CStr::from_ptr(buf.as_ptr()).to_string_lossy();
    let msg = msg.trim_end();
    if msg.is_empty() {
        return;
    }

    for suppressed in SUPPRESSED_MESSAGES {
        if msg.contains(suppressed) {
            return;
        }
    }

    if level <= ffmpeg_next::ffi::AV_LOG_ERROR as std::ffi::c_int {
        tracing::error!(target: "ffmpeg", "{}", msg);
    } else if level <= ffmpeg_next::ffi::AV_LOG_WARNING as std::ffi::c_int {
        tracing::warn!(target: "ffmpeg", "{}", msg);
    } else {
        tracing::debug!(target: "ffmpeg", "{}", msg);
    }
}

/// Get the version information of the linked libavformat.
pub fn version_info() -> String {
    // SAFETY: avformat_version only reads a compile-time constant.
    let v = unsafe { ffmpeg::ffi::avformat_version() };
    format!("libavformat {}.{}.{}", v >> 16, (v >> 8) & 0xff, v & 0xff)
}
