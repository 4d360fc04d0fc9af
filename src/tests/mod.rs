//! Integration testing module
//!
//! End-to-end tests for the segmenter:
//! - Lossy MPEG-TS and lossless fMP4 variants from synthetic sources
//! - Failure on inputs without audio
//! - Master playlist assembly over produced variants

pub mod e2e;
