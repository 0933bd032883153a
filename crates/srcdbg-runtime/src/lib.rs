#![forbid(unsafe_code)]

//! Event-driven controllers for srcdbg.
//!
//! This crate turns the pure model of `srcdbg-core` into a running debugger
//! UI core. Collaborators sit behind traits:
//!
//! - [`Editor`]: markers, line widgets, scroll tracking, coordinates.
//! - [`BreakpointClient`]: asynchronous add / remove / set-options.
//! - [`AutocompleteClient`]: asynchronous expression completion.
//!
//! On top of those:
//!
//! - [`MarkerReconciler`] keeps one editor marker per call site in sync with
//!   breakpoint presence and the show-call-sites toggle.
//! - [`ConditionPanel`] is the inline condition / log-value editor with a
//!   debounced, generation-tagged autocomplete.
//! - [`SourceDebugger`] owns all state and runs the whole flow.
//!
//! Everything is single-threaded. Time is injected: pass
//! `web_time::Instant`s to [`SourceDebugger::tick`] and the panel methods.
//!
//! # Example
//!
//! ```
//! use srcdbg_core::{CallSite, DebuggerConfig, SourceId, Span};
//! use srcdbg_runtime::SourceDebugger;
//! use srcdbg_runtime::testing::{
//!     RecordingAutocompleteClient, RecordingBreakpointClient, RecordingEditor,
//! };
//!
//! let mut dbg = SourceDebugger::new(
//!     DebuggerConfig::default().with_show_call_sites(true),
//!     RecordingBreakpointClient::default(),
//!     RecordingAutocompleteClient::default(),
//! );
//! dbg.attach_editor(RecordingEditor::new(1));
//! dbg.new_source("foo.js", "http://localhost:8000/foo.js");
//! dbg.select_location(&SourceId::new("foo.js")).unwrap();
//! dbg.set_call_sites("foo.js", vec![CallSite::new(Span::on_line("foo.js", 2, 5, 10))]);
//! assert_eq!(dbg.markers().live_count(), 1);
//! ```

pub mod client;
pub mod debounce;
pub mod debugger;
pub mod editor;
pub mod markers;
pub mod panel;
pub mod testing;

pub use client::{AutocompleteClient, AutocompleteRequest, BreakpointClient};
pub use debounce::Debouncer;
pub use debugger::{SourceDebugger, ToggleOutcome};
pub use editor::{Editor, EditorId, LineTextFn, MarkerId, ScrollParentId, WidgetId};
pub use markers::{CallSiteMarker, LiveMarker, MarkerProps, MarkerReconciler};
pub use panel::{ConditionPanel, KeyOutcome, PanelCommit, PanelKey};
