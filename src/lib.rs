//! profile-explain Library
//!
//! Rebuilds `explain` commands from MongoDB profiler records.

pub mod config;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use services::explain::{
    Approximation, OperationKind, ProjectedExample, RawProfilerRecord, Reconstruction,
    Reconstructor, explain_command, explain_record, reconstruct,
};
pub use services::{RecordError, RecordReader};
