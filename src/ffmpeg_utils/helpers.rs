//! Safe wrappers around FFmpeg FFI calls.
//!
//! Raw field access on codec parameters and output streams that
//! `ffmpeg-next` does not expose, plus path conversion for the raw open
//! calls. Every function here is safe to call.

use std::ffi::CString;
use std::path::Path;

use ffmpeg_next as ffmpeg;

// ── Codec-parameter field accessors ─────────────────────────────────────────

/// Read `sample_rate` from an `AVCodecParameters` struct.
///
/// `ffmpeg-next` does not expose this field through a safe accessor.
pub fn codec_params_sample_rate(params: &ffmpeg::codec::parameters::Parameters) -> u32 {
    // SAFETY: `params.as_ptr()` returns a valid non-null pointer for the
    // lifetime of `params`. `sample_rate` is a plain i32 field with no
    // ownership semantics.
    unsafe { (*params.as_ptr()).sample_rate.max(0) as u32 }
}

/// Read `ch_layout.nb_channels` from an `AVCodecParameters` struct.
pub fn codec_params_channels(params: &ffmpeg::codec::parameters::Parameters) -> u16 {
    // SAFETY: same as `codec_params_sample_rate`.
    unsafe { (*params.as_ptr()).ch_layout.nb_channels.max(0) as u16 }
}

/// Read `bit_rate` from an `AVCodecParameters` struct.
pub fn codec_params_bit_rate(params: &ffmpeg::codec::parameters::Parameters) -> u64 {
    // SAFETY: same as `codec_params_sample_rate`; `bit_rate` is a plain i64.
    unsafe { (*params.as_ptr()).bit_rate.max(0) as u64 }
}

// ── Output stream setup ──────────────────────────────────────────────────────

/// Copy codec parameters verbatim onto an output stream.
///
/// Unlike `StreamMut::set_parameters`, this surfaces the return code of
/// `avcodec_parameters_copy` so an allocation failure is reported instead of
/// silently leaving the stream half-configured.
pub fn stream_copy_parameters(
    out_stream: &mut ffmpeg::format::stream::StreamMut,
    params: &ffmpeg::codec::parameters::Parameters,
) -> Result<(), ffmpeg::Error> {
    // SAFETY: both pointers are valid for the duration of the call. The
    // destination `codecpar` is allocated by `avformat_new_stream`.
    let ret = unsafe {
        ffmpeg::ffi::avcodec_parameters_copy((*out_stream.as_mut_ptr()).codecpar, params.as_ptr())
    };
    if ret < 0 {
        Err(ffmpeg::Error::from(ret))
    } else {
        Ok(())
    }
}

/// Zero out `codec_tag` on the `AVCodecParameters` attached to an output
/// stream, so the muxer picks the correct tag for the target container.
///
/// Must be called after the parameter copy and before `write_header`.
pub fn stream_reset_codec_tag(out_stream: &mut ffmpeg::format::stream::StreamMut) {
    // SAFETY: `out_stream.as_mut_ptr()` is valid for the lifetime of the
    // stream. `codecpar` is allocated by `avformat_new_stream` and non-null.
    unsafe {
        (*(*out_stream.as_mut_ptr()).codecpar).codec_tag = 0;
    }
}

/// Overwrite the declared `bit_rate` on an output stream's codec parameters.
///
/// This only changes container metadata. No encoder is involved, so the
/// bitrate of the samples themselves is unaffected.
pub fn stream_set_bit_rate(out_stream: &mut ffmpeg::format::stream::StreamMut, bit_rate: i64) {
    // SAFETY: same as `stream_reset_codec_tag`; `bit_rate` is a plain i64.
    unsafe {
        (*(*out_stream.as_mut_ptr()).codecpar).bit_rate = bit_rate;
    }
}

/// Read the declared `bit_rate` back from an output stream.
pub fn stream_bit_rate(out_stream: &mut ffmpeg::format::stream::StreamMut) -> i64 {
    // SAFETY: same as `stream_reset_codec_tag`; read-only access.
    unsafe { (*(*out_stream.as_mut_ptr()).codecpar).bit_rate }
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// C string for a filesystem path handed to libavformat.
///
/// On Unix the raw path bytes are passed through, so non-UTF-8 names reach
/// FFmpeg unchanged. `None` when the path contains a NUL byte.
pub fn path_to_cstring(path: &Path) -> Option<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();

    CString::new(bytes).ok()
}
