//! Cleans an IPUMS person extract into the post-stratification table used to
//! weight survey responses: recodes categorical columns through a code
//! dictionary, harmonizes them to the survey's taxonomy, bands ages, and
//! writes the result as CSV.

pub mod config;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod process;

pub use config::Config;
pub use error::CleanError;
pub use pipeline::{run, RunSummary};
