use comet_types::{ComponentId, Diagnostics};
use serde::Serialize;

/// Classification of every known component at one point in time.
///
/// Ids are scope-stripped, version-less and sorted. A component may appear
/// in several lists (modified and staged, for example).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub untracked: Vec<ComponentId>,
    pub new: Vec<ComponentId>,
    pub modified: Vec<ComponentId>,
    pub staged: Vec<ComponentId>,
    /// Orphaned model entries and similar warnings.
    pub diagnostics: Diagnostics,
}

impl StatusReport {
    /// Nothing to add, commit or export.
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty()
            && self.new.is_empty()
            && self.modified.is_empty()
            && self.staged.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.untracked.len() + self.new.len() + self.modified.len() + self.staged.len()
    }
}
