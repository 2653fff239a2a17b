//! MongoDB Profiler Explain Reconstruction
//!
//! Turns a `system.profile` record into the `explain` command that reproduces
//! the execution plan of the logged operation.
//!
//! # Architecture
//!
//! ```text
//! RawProfilerRecord ──extract()──▶ ProjectedExample ──Reconstructor──▶ Reconstruction
//!                                                         │
//!                                          ┌──────────────┼──────────────┐
//!                                          ▼              ▼              ▼
//!                                     query rules    write rules   getmore/command
//!                                     Q001-Q003      U001 D001     M001 M002 C001
//!                                                    I001
//! ```
//!
//! Profiler records changed shape with almost every server release; each
//! known shape is handled by one rule in [`reconstructor::rules`]. The engine
//! never fails. When a record cannot be rebuilt faithfully the result still
//! carries a usable command and lists the [`Approximation`] that was made.
//!
//! # Usage
//!
//! ```
//! use bson::doc;
//! use profile_explain::services::explain::{OperationKind, ProjectedExample, explain_command};
//!
//! let example = ProjectedExample {
//!     ns: "test.foo".to_string(),
//!     op: OperationKind::Query,
//!     query: doc! { "a": 1 },
//!     ..Default::default()
//! };
//! assert_eq!(
//!     explain_command(&example),
//!     doc! { "explain": { "find": "foo", "filter": { "a": 1 } } }
//! );
//! ```

pub mod extractor;
pub mod models;
pub mod reconstructor;


pub use extractor::{RawProfilerRecord, extract};
pub use models::*;
pub use reconstructor::Reconstructor;

use bson::Document;
use once_cell::sync::Lazy;

static RECONSTRUCTOR: Lazy<Reconstructor> = Lazy::new(Reconstructor::new);

/// Rebuild the explain command for an example, with its approximations
pub fn reconstruct(example: &ProjectedExample) -> Reconstruction {
    RECONSTRUCTOR.reconstruct(example)
}

/// Rebuild the explain command for an example
pub fn explain_command(example: &ProjectedExample) -> Document {
    reconstruct(example).into_command()
}

/// Project a profiler record and rebuild its explain command
pub fn explain_record(record: &RawProfilerRecord) -> Reconstruction {
    reconstruct(&extract(record))
}
