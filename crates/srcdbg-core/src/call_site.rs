#![forbid(unsafe_code)]

//! Call-site to breakpoint resolution.
//!
//! A breakpoint may slide off the column it was requested at when the
//! debuggee reparses a source, so matching is by column range, never by
//! exact column: for each single-line call site the columns
//! `start.column..end.column` are scanned in order and the first breakpoint
//! found wins (lowest column first).

use crate::breakpoint::{Breakpoint, BreakpointStore};
use crate::location::{CallSite, Location, SourceId, Span, to_source_line};
use crate::rejection::Rejection;

/// Editor marker style for a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    /// Plain call site, no breakpoint inside.
    CallSite,
    /// Call site holding a breakpoint.
    CallSiteBreakpoint,
}

impl MarkerStyle {
    #[must_use]
    pub const fn for_breakpoint(has_breakpoint: bool) -> Self {
        if has_breakpoint {
            Self::CallSiteBreakpoint
        } else {
            Self::CallSite
        }
    }

    /// Class name the editor styles the marker with.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::CallSite => "call-site",
            Self::CallSiteBreakpoint => "call-site-bp",
        }
    }
}

/// A call site paired with the breakpoint it holds, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCallSite<'a> {
    pub call_site: &'a CallSite,
    pub breakpoint: Option<&'a Breakpoint>,
}

impl ResolvedCallSite<'_> {
    #[must_use]
    pub fn style(&self) -> MarkerStyle {
        MarkerStyle::for_breakpoint(self.breakpoint.is_some())
    }
}

/// First breakpoint (lowest column) inside a single-line span.
#[must_use]
pub fn find_breakpoint_in_span<'a>(
    span: &Span,
    breakpoints: &'a BreakpointStore,
) -> Option<&'a Breakpoint> {
    if !span.is_single_line() {
        return None;
    }
    let source_id = &span.start.source_id;
    let line = span.start.line;
    (span.start.column..span.end.column).find_map(|column| breakpoints.at(source_id, line, column))
}

/// Pair every single-line call site with its breakpoint.
///
/// Multi-line call sites are dropped; output order follows input order.
#[must_use]
pub fn resolve<'a>(
    call_sites: &'a [CallSite],
    breakpoints: &'a BreakpointStore,
) -> Vec<ResolvedCallSite<'a>> {
    call_sites
        .iter()
        .filter(|call_site| call_site.is_single_line())
        .map(|call_site| ResolvedCallSite {
            call_site,
            breakpoint: find_breakpoint_in_span(&call_site.location, breakpoints),
        })
        .collect()
}

/// What a breakpoint toggle should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TogglePlan {
    /// Add a breakpoint at this (1-based) location.
    Add(Location),
    /// Remove the breakpoint recorded at this location.
    Remove(Location),
    /// Nothing to do.
    Ignored(Rejection),
}

/// Decide how to toggle the breakpoint at an editor position.
///
/// `editor_line` is 0-based. When the position lies inside a single-line
/// call site the whole call-site span is scanned, so a breakpoint that slid
/// within the call is found and removed at its recorded column. Otherwise
/// only the exact column is checked.
#[must_use]
pub fn plan_toggle(
    active: Option<&SourceId>,
    call_sites: &[CallSite],
    breakpoints: &BreakpointStore,
    editor_line: u32,
    column: u32,
) -> TogglePlan {
    let Some(source_id) = active else {
        return TogglePlan::Ignored(Rejection::NoActiveSource);
    };
    let line = to_source_line(editor_line);

    let enclosing = call_sites.iter().find(|call_site| {
        call_site.source_id() == source_id && call_site.location.contains(line, column)
    });
    let existing = match enclosing {
        Some(call_site) => find_breakpoint_in_span(&call_site.location, breakpoints),
        None => breakpoints.at(source_id, line, column),
    };

    match existing {
        Some(bp) if bp.loading => TogglePlan::Ignored(Rejection::ReentrantToggle),
        Some(bp) => TogglePlan::Remove(Location::new(source_id.clone(), line, bp.location.column)),
        None => TogglePlan::Add(Location::new(source_id.clone(), line, column)),
    }
}
