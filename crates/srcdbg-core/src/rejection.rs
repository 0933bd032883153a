#![forbid(unsafe_code)]

//! Locally absorbed failures.
//!
//! Nothing in the debugger core is fatal. Operations that cannot apply
//! degrade to no-ops and report one of these reasons so callers and logs can
//! tell why nothing happened.

use std::fmt;

/// Why an operation was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// `select` targeted a source that is not open (or not registered).
    InvalidSelection,
    /// A breakpoint mutation hit a breakpoint whose round-trip is in flight.
    ReentrantToggle,
    /// An autocomplete result arrived for a closed or superseded request.
    StaleAutocompleteResult,
    /// A marker or panel operation ran with no editor bound.
    MissingEditorBinding,
    /// A breakpoint toggle ran with no active source selected.
    NoActiveSource,
}

impl Rejection {
    /// Stable snake_case name used as the `reason` field in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSelection => "invalid_selection",
            Self::ReentrantToggle => "reentrant_toggle",
            Self::StaleAutocompleteResult => "stale_autocomplete_result",
            Self::MissingEditorBinding => "missing_editor_binding",
            Self::NoActiveSource => "no_active_source",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Rejection {}
