//! Master playlist assembler
//!
//! Collects the variant playlists of one codec kind from a directory and
//! writes a master playlist referencing each of them. Variants are found
//! through their sidecar manifests first; playlists without a manifest are
//! recognised by their `hls_<codec>_<kbps>.m3u8` file name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::MasterConfig;
use crate::error::{HlsError, Result};
use crate::segment::CodecKind;

use super::manifest::read_manifests;

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// One variant referenced by the master playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub bitrate_kbps: u32,
    /// Playlist file name, relative to the variant directory
    pub playlist: String,
}

/// Recognise a variant playlist by name: `hls_mp3_320.m3u8`, `hls_flac_900.m3u8`.
///
/// Returns `None` for other names and for a zero bitrate.
pub fn parse_playlist_name(name: &str) -> Option<(CodecKind, u32)> {
    let caps = regex!(r"^hls_(mp3|flac)_(\d+)\.m3u8$").captures(name)?;
    let kind = match &caps[1] {
        "flac" => CodecKind::Lossless,
        _ => CodecKind::Lossy,
    };
    let bitrate: u32 = caps[2].parse().ok()?;
    (bitrate > 0).then_some((kind, bitrate))
}

/// Find the variants of `kind` directly inside `variant_dir`
pub fn discover_entries(
    variant_dir: &Path,
    kind: CodecKind,
    sort_by_bitrate: bool,
) -> Result<Vec<PlaylistEntry>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for manifest in read_manifests(variant_dir)? {
        if manifest.kind != kind || manifest.bitrate_kbps == 0 {
            continue;
        }
        if !variant_dir.join(&manifest.playlist).is_file() {
            tracing::warn!(
                "Manifest references missing playlist {:?} in {:?}",
                manifest.playlist,
                variant_dir
            );
            continue;
        }
        if seen.insert(manifest.playlist.clone()) {
            entries.push(PlaylistEntry {
                bitrate_kbps: manifest.bitrate_kbps,
                playlist: manifest.playlist,
            });
        }
    }

    for dir_entry in std::fs::read_dir(variant_dir)? {
        let dir_entry = dir_entry?;
        // Symlinked playlists count as variants
        if !dir_entry.path().is_file() {
            continue;
        }
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        let Some((found_kind, bitrate_kbps)) = parse_playlist_name(&name) else {
            continue;
        };
        if found_kind != kind || seen.contains(&name) {
            continue;
        }
        seen.insert(name.clone());
        entries.push(PlaylistEntry {
            bitrate_kbps,
            playlist: name,
        });
    }

    if sort_by_bitrate {
        entries.sort_by(|a, b| {
            a.bitrate_kbps
                .cmp(&b.bitrate_kbps)
                .then_with(|| a.playlist.cmp(&b.playlist))
        });
    }

    Ok(entries)
}

/// Render the master playlist.
///
/// `BANDWIDTH` carries the bitrate in kbps, as recorded in the variant name.
pub fn generate_master_playlist(entries: &[PlaylistEntry], kind: CodecKind) -> String {
    let mut output = String::from("#EXTM3U\n");
    for entry in entries {
        output.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},CODECS=\"{}\"\n",
            entry.bitrate_kbps,
            kind.codec_tag()
        ));
        output.push_str(&entry.playlist);
        output.push('\n');
    }
    output
}

/// Assemble `<output_dir>/<config.filename>` from the variants in `variant_dir`.
///
/// Nothing is written when no variant of the requested kind is found.
pub fn write_master_playlist(
    variant_dir: &Path,
    output_dir: &Path,
    lossless: bool,
    config: &MasterConfig,
) -> Result<PathBuf> {
    let kind = CodecKind::from_lossless(lossless);
    let entries = discover_entries(variant_dir, kind, config.sort_by_bitrate)?;
    if entries.is_empty() {
        return Err(HlsError::NoPlaylistsFound(variant_dir.to_path_buf()));
    }

    let master_path = output_dir.join(&config.filename);
    let content = generate_master_playlist(&entries, kind);
    std::fs::create_dir_all(output_dir)
        .and_then(|_| std::fs::write(&master_path, content))
        .map_err(|source| HlsError::PlaylistWrite {
            path: master_path.clone(),
            source,
        })?;

    tracing::info!(
        "Master playlist {:?} references {} {} variant(s)",
        master_path,
        entries.len(),
        kind
    );
    Ok(master_path)
}
