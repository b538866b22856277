use std::time::Duration;

use crate::debounce::Debouncer;
use crate::state::{Action, Dashboard};

/// Quiet period between the last keystroke and the committed search term.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Buffers keystrokes and commits the final term to the dashboard as one
/// `CommitSearch` once typing pauses. Intermediate drafts never reach the
/// state, so they trigger no refetch.
#[derive(Clone)]
pub struct SearchDebouncer {
    debouncer: Debouncer<String>,
}

impl SearchDebouncer {
    pub fn new(dashboard: Dashboard) -> Self {
        Self::with_window(dashboard, SEARCH_DEBOUNCE)
    }

    pub fn with_window(dashboard: Dashboard, window: Duration) -> Self {
        let debouncer = Debouncer::new(window, move |term| {
            dashboard.dispatch(Action::CommitSearch(term));
        });
        Self { debouncer }
    }

    /// Record a keystroke; restarts the quiet period.
    pub fn input(&self, draft: impl Into<String>) {
        self.debouncer.update(draft.into());
    }

    /// Discard the pending draft, for instance when filters are cleared
    /// while the user is mid-typing.
    pub fn reset(&self) {
        self.debouncer.reset();
    }
}
