//! Playlist module
//!
//! - Reading back the variant playlists the muxer produced
//! - Sidecar manifests describing each produced variant
//! - Master playlist (master.m3u8) assembly across variants

pub mod manifest;
pub mod master;
pub mod variant;

pub use manifest::VariantManifest;
pub use master::{
    discover_entries, generate_master_playlist, write_master_playlist, PlaylistEntry,
};
pub use variant::VariantPlaylist;
