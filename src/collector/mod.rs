//! Profile directory collector.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               ProfileCollector                │
//! │   <root>/*  ──►  load_job_step  ──►  parser   │
//! │                         │                     │
//! │                  ┌──────▼──────┐              │
//! │                  │  FileSystem │ (trait)      │
//! │                  └──────┬──────┘              │
//! └─────────────────────────┼─────────────────────┘
//!                  ┌────────┴────────┐
//!           ┌──────▼──────┐   ┌──────▼──────┐
//!           │   RealFs    │   │   MockFs    │
//!           │ (disk)      │   │ (Testing)   │
//!           └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use slurm_profile_exporter::collector::{MockFs, ProfileCollector};
//! use slurm_profile_exporter::collector::mock::PROFILE_ROOT;
//!
//! let collector = ProfileCollector::new(MockFs::typical_node(), PROFILE_ROOT);
//! let series = collector.collect();
//! assert!(!series.is_empty());
//! ```

pub mod mock;
pub mod profile;
pub mod traits;

pub use mock::MockFs;
pub use profile::{ProfileCollector, ScanLimits};
pub use traits::{FileSystem, RealFs};
