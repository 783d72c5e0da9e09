//! Preference store seam - durable key/value state scoped to one widget
//! instance.

/// Durable key/value store provided by the host sandbox.
///
/// The only state the panel keeps across sessions lives here (project
/// names, active filter, user name).
pub trait PreferenceStore: Send + Sync {
    /// Read a preference, `None` if unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a preference.
    fn set(&self, key: &str, value: &str);
}
