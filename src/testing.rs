//! Testing utilities including mock collaborator implementations.
//!
//! These let panel logic run end to end without a host sandbox: the mock
//! host records renders and notices, and the memory preference store
//! holds keys in a map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::traits::host::HostPanel;
use crate::traits::prefs::PreferenceStore;

/// Mock host that records every render, notice, and resize request.
#[derive(Default)]
pub struct MockHost {
    rendered: Arc<RwLock<Vec<String>>>,
    notices: Arc<RwLock<Vec<(String, u32)>>>,
    resizes: Arc<AtomicUsize>,
}

impl MockHost {
    /// Create a new mock host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every HTML payload rendered so far, oldest first.
    pub fn renders(&self) -> Vec<String> {
        self.rendered.read().unwrap().clone()
    }

    /// The most recent render, if any.
    pub fn last_render(&self) -> Option<String> {
        self.rendered.read().unwrap().last().cloned()
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.rendered.read().unwrap().len()
    }

    /// All transient notices shown so far.
    pub fn notices(&self) -> Vec<(String, u32)> {
        self.notices.read().unwrap().clone()
    }

    /// Number of transient notices shown so far.
    pub fn notice_count(&self) -> usize {
        self.notices.read().unwrap().len()
    }

    /// Number of resize requests so far.
    pub fn resize_count(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }
}

impl Clone for MockHost {
    fn clone(&self) -> Self {
        Self {
            rendered: Arc::clone(&self.rendered),
            notices: Arc::clone(&self.notices),
            resizes: Arc::clone(&self.resizes),
        }
    }
}

impl HostPanel for MockHost {
    fn render(&self, html: &str) {
        self.rendered.write().unwrap().push(html.to_string());
    }

    fn notify_transient(&self, message: &str, seconds: u32) {
        self.notices
            .write()
            .unwrap()
            .push((message.to_string(), seconds));
    }

    fn request_resize(&self) {
        self.resizes.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory preference store.
#[derive(Default)]
pub struct MemoryPrefs {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPrefs {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`PreferenceStore::set`].
    pub fn with(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }
}

impl Clone for MemoryPrefs {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl PreferenceStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_host_records_calls() {
        let host = MockHost::new();
        host.render("<p>hi</p>");
        host.notify_transient("oops", 5);
        host.request_resize();

        assert_eq!(host.render_count(), 1);
        assert_eq!(host.last_render().as_deref(), Some("<p>hi</p>"));
        assert_eq!(host.notices(), vec![("oops".to_string(), 5)]);
        assert_eq!(host.resize_count(), 1);
    }

    #[test]
    fn test_memory_prefs() {
        let prefs = MemoryPrefs::new().with("projectName", "alpha");
        assert_eq!(prefs.get("projectName").as_deref(), Some("alpha"));
        assert_eq!(prefs.get("missing"), None);

        prefs.set("projectName", "beta");
        assert_eq!(prefs.get("projectName").as_deref(), Some("beta"));
    }
}
