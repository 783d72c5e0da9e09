//! Host panel seam - the sandbox's display and notification primitives.

/// Display-side collaborator implemented by the host sandbox.
///
/// All calls are fire-and-forget from the core's perspective; the host
/// owns the display region and its lifecycle.
pub trait HostPanel: Send + Sync {
    /// Replace the display region's content.
    fn render(&self, html: &str);

    /// Show an auto-dismissing notice for `seconds`.
    fn notify_transient(&self, message: &str, seconds: u32);

    /// Ask the host to re-measure the display region after a content
    /// change.
    fn request_resize(&self);
}
