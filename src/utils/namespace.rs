//! Namespace helpers
//!
//! MongoDB identifies a collection by its namespace, `"<database>.<collection>"`.
//! Collection names may themselves contain dots (`"app.system.profile"`), so
//! only the first dot separates the two parts.

/// Collection part of a namespace (everything after the first `.`).
///
/// Returns an empty string when the namespace has no `.`.
///
/// # Example
/// ```
/// use profile_explain::utils::namespace::collection;
///
/// assert_eq!(collection("test.foo"), "foo");
/// assert_eq!(collection("app.system.profile"), "system.profile");
/// assert_eq!(collection("nodot"), "");
/// ```
#[inline]
pub fn collection(ns: &str) -> &str {
    ns.split_once('.').map(|(_, coll)| coll).unwrap_or("")
}

/// Database part of a namespace (everything before the first `.`).
///
/// A namespace without `.` is taken to be a bare database name.
#[inline]
pub fn database(ns: &str) -> &str {
    ns.split_once('.').map(|(db, _)| db).unwrap_or(ns)
}
