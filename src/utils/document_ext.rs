//! Ordered document helpers
//!
//! The server identifies a command by the name of its first key, so every
//! helper here keeps the insertion order of the fields it does not touch.

use bson::{Bson, Document};

/// Copy of `doc` without the first field named `name`.
///
/// The remaining fields keep their relative order. Returns an identical copy
/// when no such field exists.
///
/// # Example
/// ```
/// use bson::doc;
/// use profile_explain::utils::document_ext::without_field;
///
/// let cmd = doc! { "find": "foo", "filter": { "a": 1 }, "$db": "test" };
/// assert_eq!(without_field(&cmd, "$db"), doc! { "find": "foo", "filter": { "a": 1 } });
/// ```
pub fn without_field(doc: &Document, name: &str) -> Document {
    let mut removed = false;
    doc.iter()
        .filter(|(key, _)| {
            if !removed && key.as_str() == name {
                removed = true;
                return false;
            }
            true
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Extension trait for command-shaped documents
pub trait DocumentExt {
    /// Name of the first key, which is the command verb for command documents
    fn first_key(&self) -> Option<&str>;

    /// Value stored under the first key
    fn first_value(&self) -> Option<&Bson>;

    /// Whether the first key equals `name`
    fn first_key_is(&self, name: &str) -> bool {
        self.first_key() == Some(name)
    }

    /// See [`without_field`]
    fn without_field(&self, name: &str) -> Document;
}

impl DocumentExt for Document {
    #[inline]
    fn first_key(&self) -> Option<&str> {
        self.keys().next().map(String::as_str)
    }

    #[inline]
    fn first_value(&self) -> Option<&Bson> {
        self.values().next()
    }

    #[inline]
    fn without_field(&self, name: &str) -> Document {
        without_field(self, name)
    }
}
