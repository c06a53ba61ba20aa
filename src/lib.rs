//! slurm-profile-exporter - Prometheus exporter for Slurm's
//! `acct_gather_profile/exporter` plugin.
//!
//! The plugin writes one directory per job step under `ProfileExporterDir`,
//! each holding an `alloc` file and one sample file per task. This library
//! provides:
//! - `collector` - scanning of that tree into labelled samples
//! - `model` - samples and per-metric time series
//! - `exposition` - rendering series in the Prometheus text format
//! - `config` - discovery of the profile directory from `scontrol`
//! - `server` - the `/metrics` + `/probe` HTTP surface

pub mod collector;
pub mod config;
pub mod exposition;
pub mod model;
pub mod server;

/// Package version with the short git SHA of the build.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_SHA"));
