//! Collection of `acct_gather_profile/exporter` output.
//!
//! Layout under the profile directory:
//!
//! ```text
//! <root>/<jobid>.<stepid>/alloc      user, node (+ allocation details)
//! <root>/<jobid>.<stepid>/<task>     time + one metric per line
//! ```

mod collector;
mod job_step;
mod parser;

pub use collector::{ProfileCollector, ScanLimits};
pub use job_step::{ALLOC_FILE, AllocInfo, JobStepError, JobStepId, TIME_KEY, load_job_step};
pub use parser::{ParseError, parse_key_values};
