pub mod document_ext;
pub mod namespace;

pub use document_ext::{DocumentExt, without_field};
