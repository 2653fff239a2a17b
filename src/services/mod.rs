pub mod explain;
pub mod record_reader;

pub use explain::{ProjectedExample, RawProfilerRecord, Reconstruction, Reconstructor};
pub use record_reader::{RecordError, RecordReader, RecordResult};
