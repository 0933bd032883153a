#![forbid(unsafe_code)]

//! Core: sources, tabs, breakpoints, and call-site resolution.
//!
//! # Role in srcdbg
//! `srcdbg-core` is the pure state layer of the source debugger UI. It owns
//! the ordered set of open source tabs and the active selection, the shared
//! breakpoint store, and the column-scan that decides which call-site span a
//! breakpoint belongs to.
//!
//! # Primary responsibilities
//! - **TabStore**: ordered tabs with single-active-selection semantics and the
//!   right-first, else-left, else-none reselection policy on close.
//! - **BreakpointStore**: breakpoints keyed by `(source, line, column)`, with
//!   an explicit `loading` flag while an add/remove round-trip is in flight.
//! - **Call-site resolution**: first-match-wins column scan inside each
//!   single-line call-site span, plus toggle planning.
//! - **DebuggerConfig**: tunables loaded from defaults, environment, or TOML.
//!
//! # How it fits in the system
//! `srcdbg-runtime` drives these reducers from editor and user events, talks
//! to the editor and breakpoint services, and reconciles editor markers.
//! Nothing here performs I/O or reads a clock; time is always injected.

pub mod breakpoint;
pub mod call_site;
pub mod config;
pub mod location;
pub mod rejection;
pub mod source;
pub mod tabs;

pub use breakpoint::{
    Breakpoint, BreakpointOptions, BreakpointStore, CompleteAddOutcome, OptionField,
    SetOptionsOutcome,
};
pub use call_site::{
    MarkerStyle, ResolvedCallSite, TogglePlan, find_breakpoint_in_span, plan_toggle, resolve,
};
pub use config::{ConfigError, DebuggerConfig};
pub use location::{
    CallSite, EditorPosition, Location, SourceId, Span, to_editor_line, to_source_line,
};
pub use rejection::Rejection;
pub use source::{Source, SourceRegistry};
pub use tabs::{Tab, TabStore};
