// crates/branchmap-core/src/selector/state.rs
use serde::{Deserialize, Serialize};

/// The two mutually exclusive views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Overview,
    RegionDetail,
}

/// Transient feedback shown in the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NoBranches { region: String },
}

/// What the host reads back: `{ region, branch }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub region: Option<String>,
    pub branch: Option<String>,
}

/// Ephemeral UI state of one selector.
///
/// Fields are private: only the transition methods below (driven by
/// [`super::Selector`]) mutate it, which keeps view and selection in step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    view: View,
    selected_region: Option<String>,
    selected_branch: Option<String>,
    filter: String,
    notice: Option<Notice>,
}

impl SelectionState {
    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    pub fn selected_branch(&self) -> Option<&str> {
        self.selected_branch.as_deref()
    }

    /// Raw filter text as typed (trimming happens when filtering).
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selection(&self) -> Selection {
        Selection {
            region: self.selected_region.clone(),
            branch: self.selected_branch.clone(),
        }
    }

    /// Overview -> RegionDetail. Branch, filter and notice are cleared.
    pub(crate) fn enter_region(&mut self, region: &str) {
        *self = SelectionState {
            view: View::RegionDetail,
            selected_region: Some(region.to_owned()),
            ..SelectionState::default()
        };
    }

    /// Back to the initial state. Returns `true` if anything changed.
    pub(crate) fn reset(&mut self) -> bool {
        let changed = *self != SelectionState::default();
        *self = SelectionState::default();
        changed
    }

    /// Replaces any previous branch mark; at most one branch is selected.
    pub(crate) fn mark_branch(&mut self, branch: &str) {
        self.selected_branch = Some(branch.to_owned());
    }

    pub(crate) fn set_filter(&mut self, text: &str) {
        self.filter = text.to_owned();
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }
}
