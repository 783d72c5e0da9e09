//! Collaborator seams the host sandbox implements.
//!
//! The panel core never talks to the network, the display region, or the
//! preference store directly; everything goes through these traits so
//! tests can inject mocks.

pub mod fetcher;
pub mod host;
pub mod prefs;
