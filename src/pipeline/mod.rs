//! The fetch-aggregate-render pipeline.
//!
//! One user action (filter change, page change, initial load) triggers
//! one cycle: fan out fetches, wait for every source to settle, merge and
//! sort the extracted records, slice the current page, render.

pub mod driver;
pub mod orchestrate;

pub use driver::{CycleOutcome, PanelDriver};
pub use orchestrate::{fetch_all_sources, SourceOutcome, SourceRequest};
