//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Segment audio files into HLS variants and assemble master playlists.
#[derive(Parser, Debug, Clone)]
#[command(name = "hls-audio-segmenter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults are used when it does not exist.
    #[arg(short, long, global = true, default_value = "hls-segmenter.toml")]
    pub config: PathBuf,

    /// Logging level, overriding the configuration file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write one HLS variant of INPUT into OUTPUT_DIR.
    Segment {
        input: PathBuf,
        output_dir: PathBuf,

        /// Produce fMP4/FLAC segments instead of MPEG-TS.
        #[arg(long)]
        lossless: bool,

        /// Use this bitrate (kbps) instead of probing the input.
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        bitrate: Option<u32>,
    },

    /// Write the master playlist for the variants in VARIANT_DIR.
    Master {
        variant_dir: PathBuf,

        /// Directory the master playlist is written to (default: VARIANT_DIR).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reference the lossless variants instead of the lossy ones.
        #[arg(long)]
        lossless: bool,
    },

    /// Print the bitrate of INPUT in kbps.
    Probe { input: PathBuf },

    /// Write the default configuration to PATH.
    InitConfig { path: PathBuf },
}
