//! Dashboard view state: thin fetch-and-hold wrappers with loading/error/
//! refresh semantics and no merge logic.

pub mod chats;
pub mod progress;
pub mod resources;
pub mod sessions;

pub use chats::ChatSummaryView;
pub use progress::{ProgressSource, ProgressView};
pub use resources::{ResourceMetricsSource, ResourceMetricsView};
pub use sessions::{SessionStatsSource, SessionStatsView};

use crate::error::AppResult;

/// Data / loading / error triple backing a dashboard widget.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A failed refresh keeps the previous data so the widget can show
    /// stale content alongside the error.
    pub(crate) fn resolve(&mut self, result: AppResult<T>) {
        self.loading = false;
        match result {
            Ok(value) => self.data = Some(value),
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_loadable_transitions() {
        let mut state: Loadable<u32> = Loadable::default();
        state.begin();
        assert!(state.loading);

        state.resolve(Ok(7));
        assert_eq!(state.data, Some(7));
        assert!(!state.loading);
        assert!(state.error.is_none());

        state.begin();
        state.resolve(Err(AppError::NotFound));
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.as_deref(), Some("not found"));
    }
}
