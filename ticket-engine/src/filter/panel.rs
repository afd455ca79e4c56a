use shared_types::{FilterState, INITIAL_FILTERS};

/// Applied filters plus an optional draft being edited.
///
/// Edits only ever touch the draft. `apply` replaces the applied filters wholesale and
/// `cancel` throws the draft away, so the applied state never reflects a half-finished edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPanel {
    applied: FilterState,
    draft: Option<FilterState>,
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(applied: FilterState) -> Self {
        Self {
            applied,
            draft: None,
        }
    }

    pub fn applied(&self) -> &FilterState {
        &self.applied
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Opens the panel, seeding the draft from the applied filters
    pub fn begin_edit(&mut self) -> &mut FilterState {
        let applied = &self.applied;
        self.draft.get_or_insert_with(|| applied.clone())
    }

    pub fn draft(&self) -> Option<&FilterState> {
        self.draft.as_ref()
    }

    /// Commits the draft. Returns whether the applied filters changed.
    pub fn apply(&mut self) -> bool {
        match self.draft.take() {
            Some(draft) => {
                let changed = draft != self.applied;
                self.applied = draft;
                changed
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Back to `INITIAL_FILTERS`, discarding any draft
    pub fn reset(&mut self) {
        self.draft = None;
        self.applied = INITIAL_FILTERS;
    }
}
