#![forbid(unsafe_code)]

//! Asynchronous service seams.
//!
//! Requests are fire-and-forget; results come back later through the
//! [`SourceDebugger`](crate::SourceDebugger) completion methods
//! (`breakpoint_added`, `breakpoint_removed`, `autocomplete_results`, ...),
//! one event-loop turn at a time.

use srcdbg_core::{BreakpointOptions, Location};

use crate::editor::LineTextFn;

/// The breakpoint management service.
pub trait BreakpointClient {
    /// Request a breakpoint at `location`. The service reports where the
    /// breakpoint actually landed, which may be another column.
    fn add_breakpoint(
        &mut self,
        location: &Location,
        source_url: &str,
        options: &BreakpointOptions,
        line_text: LineTextFn,
    );

    /// Request removal of the breakpoint recorded at `location`.
    fn remove_breakpoint(&mut self, location: &Location);

    /// Push new options for an existing breakpoint.
    fn set_breakpoint_options(&mut self, location: &Location, options: &BreakpointOptions);
}

/// One autocomplete request, tagged with the generation it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteRequest {
    pub generation: u64,
    pub text: String,
    pub cursor: usize,
}

/// The expression autocomplete service.
pub trait AutocompleteClient {
    /// Ask for completions. The answer must be returned with
    /// `request.generation` so stale answers can be dropped.
    fn get_matches(&mut self, request: AutocompleteRequest);
}
