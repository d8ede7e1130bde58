//! Library exports for the audio clustering pipeline, reused by the binary,
//! benchmarks, and integration tests.
/// Audio decoding and per-file descriptor extraction.
pub mod analysis;
/// Application directory helpers.
pub mod app_dirs;
/// Analysis configuration loading and validation.
pub mod config;
/// Logging setup.
pub mod logging;
/// Normalization, reduction, grouping, and result assembly.
pub mod pipeline;
/// Scatter-plot rendering and console summaries.
pub mod plot;
/// Audio file discovery.
pub mod sample_sources;
