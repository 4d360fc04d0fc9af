//! HLS audio segmenter command-line front end

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_audio_segmenter::config_file;
use hls_audio_segmenter::{
    BitrateProber, FfmpegBitrateProber, FixedBitrate, HlsSegmenter, Result, SegmenterConfig,
};

use crate::cli::{Cli, Command};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "hls-audio-segmenter";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let (mut config, config_error) = match config_file::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (SegmenterConfig::default(), Some(e)),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    init_logging(&config);
    if let Some(e) = config_error {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }
    tracing::debug!("{} v{}", APP_NAME, VERSION);

    match run(cli.command, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: SegmenterConfig) -> Result<bool> {
    if let Command::InitConfig { path } = &command {
        config_file::generate_default_config(path)?;
        tracing::info!("Wrote default configuration to {}", path.display());
        return Ok(true);
    }

    let prober: Box<dyn BitrateProber> = match &command {
        Command::Segment {
            bitrate: Some(kbps),
            ..
        } => Box::new(FixedBitrate(*kbps)),
        _ => Box::new(FfmpegBitrateProber),
    };
    let segmenter = HlsSegmenter::with_prober(config, prober)?;
    hls_audio_segmenter::install_log_filter();
    tracing::debug!("FFmpeg version: {}", hls_audio_segmenter::ffmpeg_version_info());

    let ok = match command {
        Command::Segment {
            input,
            output_dir,
            lossless,
            ..
        } => segmenter.segment_file(&input, &output_dir, lossless),
        Command::Master {
            variant_dir,
            output,
            lossless,
        } => {
            let output_dir = output.as_deref().unwrap_or(variant_dir.as_path());
            segmenter.build_master_playlist(&variant_dir, output_dir, lossless)
        }
        Command::Probe { input } => {
            let kbps = segmenter.probe_bitrate(&input)?;
            println!("{}", kbps);
            true
        }
        Command::InitConfig { .. } => true,
    };
    Ok(ok)
}

/// Initialize logging with tracing; `RUST_LOG` overrides the configured level
fn init_logging(config: &SegmenterConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hls_audio_segmenter={level},ffmpeg={level}",
            level = config.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
