//! Panel configuration, assembled from the host's preference store.

use serde::{Deserialize, Serialize};

use crate::traits::prefs::PreferenceStore;
use crate::types::query::{Filter, SortMode, MULTI_FETCH_WINDOW, PAGE_SIZE};

/// Preference keys the panel reads and writes.
pub mod pref_keys {
    pub const PROJECT: &str = "projectName";
    pub const OTHER_PROJECTS: &str = "otherProjects";
    pub const ISSUE_TYPE: &str = "issueType";
    pub const USER_NAME: &str = "userName";
}

/// Static panel configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Primary source project slug. Empty means not yet configured.
    pub project: String,

    /// Additional source projects merged into the same view.
    pub other_projects: Vec<String>,

    /// Tracker user name, required by the assigned/reported filters.
    pub user_name: String,

    /// Records per displayed page.
    pub page_size: u64,

    /// Records fetched per source in multi-source mode.
    pub multi_fetch_window: u64,

    /// Active sort column.
    pub sort: SortMode,
}

impl PanelConfig {
    /// Create a config for a single project with default paging.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            other_projects: Vec::new(),
            user_name: String::new(),
            page_size: PAGE_SIZE,
            multi_fetch_window: MULTI_FETCH_WINDOW,
            sort: SortMode::default(),
        }
    }

    /// Add secondary source projects.
    pub fn with_other_projects(
        mut self,
        projects: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.other_projects = projects.into_iter().map(|p| p.into()).collect();
        self
    }

    /// Set the tracker user name.
    pub fn with_user_name(mut self, user: impl Into<String>) -> Self {
        self.user_name = user.into();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        self
    }

    /// Set the sort column.
    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Load configuration from the preference store.
    ///
    /// The secondary-projects preference is a `|`-separated, lowercased
    /// list; empty segments are dropped.
    pub fn from_prefs<P: PreferenceStore>(prefs: &P) -> Self {
        let project = prefs.get(pref_keys::PROJECT).unwrap_or_default();
        let other_projects: Vec<String> = prefs
            .get(pref_keys::OTHER_PROJECTS)
            .unwrap_or_default()
            .to_lowercase()
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let user_name = prefs.get(pref_keys::USER_NAME).unwrap_or_default();

        Self::new(project)
            .with_other_projects(other_projects)
            .with_user_name(user_name)
    }

    /// Initial filter from preferences, guarded against filters that
    /// need a user name when none is configured.
    ///
    /// Returns the filter and whether the guard downgraded it.
    pub fn initial_filter<P: PreferenceStore>(&self, prefs: &P) -> (Filter, bool) {
        let filter = Filter::from_pref(&prefs.get(pref_keys::ISSUE_TYPE).unwrap_or_default());
        if filter.requires_user() && self.user_name.is_empty() {
            (Filter::All, true)
        } else {
            (filter, false)
        }
    }

    /// Whether a primary project has been configured.
    pub fn has_project(&self) -> bool {
        !self.project.is_empty()
    }

    /// Whether the panel aggregates a single source (no completion
    /// barrier, server-side paging) or several.
    pub fn single_source(&self) -> bool {
        self.other_projects.is_empty()
    }

    /// All source projects, primary first.
    pub fn sources(&self) -> Vec<String> {
        let mut sources = Vec::with_capacity(1 + self.other_projects.len());
        sources.push(self.project.clone());
        sources.extend(self.other_projects.iter().cloned());
        sources
    }
}
