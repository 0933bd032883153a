#![forbid(unsafe_code)]

//! Recording collaborators for deterministic tests.
//!
//! Each fake implements one collaborator trait and records every call in
//! order, so tests can assert on exact sequences ("one clear, then one
//! create") instead of on end state alone.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};
use srcdbg_core::{BreakpointOptions, EditorPosition, Location, MarkerStyle, Span};

use crate::client::{AutocompleteClient, AutocompleteRequest, BreakpointClient};
use crate::editor::{Editor, EditorId, LineTextFn, MarkerId, ScrollParentId, WidgetId};

/// One call made on a [`RecordingEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCall {
    MarkText {
        style: MarkerStyle,
        span: Span,
        marker: MarkerId,
    },
    ClearMarker(MarkerId),
    AddLineWidget(u32),
    ClearLineWidget(WidgetId),
    WatchScroll(ScrollParentId),
    UnwatchScroll(ScrollParentId),
    SetWidgetOffset {
        widget: WidgetId,
        translate_x: i32,
    },
}

/// In-memory [`Editor`].
///
/// Click coordinates map one unit per column (`x`) and per line (`y`);
/// negative coordinates miss the text.
#[derive(Debug, Default)]
pub struct RecordingEditor {
    id: u64,
    next_handle: u64,
    calls: Vec<EditorCall>,
    markers: AHashMap<MarkerId, (MarkerStyle, Span)>,
    widgets: AHashSet<WidgetId>,
    scroll_parent: Option<ScrollParentId>,
    scroll_left: AHashMap<ScrollParentId, i32>,
    watching: AHashSet<ScrollParentId>,
    lines: Rc<RefCell<AHashMap<u32, String>>>,
}

impl RecordingEditor {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Every line widget gets `parent` as its scroll parent.
    #[must_use]
    pub fn with_scroll_parent(mut self, parent: ScrollParentId) -> Self {
        self.scroll_parent = Some(parent);
        self
    }

    pub fn set_scroll_left(&mut self, parent: ScrollParentId, px: i32) {
        self.scroll_left.insert(parent, px);
    }

    /// Set the text of a 0-based editor line. Accessors handed out earlier
    /// see the change.
    pub fn set_line_text(&self, editor_line: u32, text: impl Into<String>) {
        self.lines.borrow_mut().insert(editor_line, text.into());
    }

    #[must_use]
    pub fn calls(&self) -> &[EditorCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<EditorCall> {
        std::mem::take(&mut self.calls)
    }

    #[must_use]
    pub fn live_markers(&self) -> usize {
        self.markers.len()
    }

    /// Live markers ordered by span.
    #[must_use]
    pub fn markers(&self) -> Vec<(Span, MarkerStyle)> {
        let mut live: Vec<(Span, MarkerStyle)> = self
            .markers
            .values()
            .map(|(style, span)| (span.clone(), *style))
            .collect();
        live.sort_by(|a, b| a.0.cmp(&b.0));
        live
    }

    #[must_use]
    pub fn live_widgets(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_watching(&self, parent: ScrollParentId) -> bool {
        self.watching.contains(&parent)
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Editor for RecordingEditor {
    fn id(&self) -> EditorId {
        EditorId(self.id)
    }

    fn mark_text(&mut self, style: MarkerStyle, span: &Span) -> MarkerId {
        let marker = MarkerId(self.next());
        self.markers.insert(marker, (style, span.clone()));
        self.calls.push(EditorCall::MarkText {
            style,
            span: span.clone(),
            marker,
        });
        marker
    }

    fn clear_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
        self.calls.push(EditorCall::ClearMarker(marker));
    }

    fn add_line_widget(&mut self, editor_line: u32) -> WidgetId {
        let widget = WidgetId(self.next());
        self.widgets.insert(widget);
        self.calls.push(EditorCall::AddLineWidget(editor_line));
        widget
    }

    fn clear_line_widget(&mut self, widget: WidgetId) {
        self.widgets.remove(&widget);
        self.calls.push(EditorCall::ClearLineWidget(widget));
    }

    fn scroll_parent(&self, _widget: WidgetId) -> Option<ScrollParentId> {
        self.scroll_parent
    }

    fn watch_scroll(&mut self, parent: ScrollParentId) {
        self.watching.insert(parent);
        self.calls.push(EditorCall::WatchScroll(parent));
    }

    fn unwatch_scroll(&mut self, parent: ScrollParentId) {
        self.watching.remove(&parent);
        self.calls.push(EditorCall::UnwatchScroll(parent));
    }

    fn scroll_left(&self, parent: ScrollParentId) -> i32 {
        self.scroll_left.get(&parent).copied().unwrap_or(0)
    }

    fn set_widget_offset(&mut self, widget: WidgetId, translate_x: i32) {
        self.calls.push(EditorCall::SetWidgetOffset {
            widget,
            translate_x,
        });
    }

    fn position_from_coords(&self, x: f64, y: f64) -> Option<EditorPosition> {
        if x < 0.0 || y < 0.0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(EditorPosition::new(y as u32, x as u32))
    }

    fn line_text(&self, editor_line: u32) -> LineTextFn {
        let lines = Rc::clone(&self.lines);
        LineTextFn::new(move || lines.borrow().get(&editor_line).cloned())
    }
}

/// One call made on a [`RecordingBreakpointClient`].
#[derive(Debug, Clone)]
pub enum BreakpointCall {
    Add {
        location: Location,
        source_url: String,
        options: BreakpointOptions,
        line_text: LineTextFn,
    },
    Remove(Location),
    SetOptions {
        location: Location,
        options: BreakpointOptions,
    },
}

/// [`BreakpointClient`] that only records.
#[derive(Debug, Default)]
pub struct RecordingBreakpointClient {
    calls: Vec<BreakpointCall>,
}

impl RecordingBreakpointClient {
    #[must_use]
    pub fn calls(&self) -> &[BreakpointCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BreakpointCall> {
        std::mem::take(&mut self.calls)
    }
}

impl BreakpointClient for RecordingBreakpointClient {
    fn add_breakpoint(
        &mut self,
        location: &Location,
        source_url: &str,
        options: &BreakpointOptions,
        line_text: LineTextFn,
    ) {
        self.calls.push(BreakpointCall::Add {
            location: location.clone(),
            source_url: source_url.to_owned(),
            options: options.clone(),
            line_text,
        });
    }

    fn remove_breakpoint(&mut self, location: &Location) {
        self.calls.push(BreakpointCall::Remove(location.clone()));
    }

    fn set_breakpoint_options(&mut self, location: &Location, options: &BreakpointOptions) {
        self.calls.push(BreakpointCall::SetOptions {
            location: location.clone(),
            options: options.clone(),
        });
    }
}

/// [`AutocompleteClient`] that only records.
#[derive(Debug, Default)]
pub struct RecordingAutocompleteClient {
    requests: Vec<AutocompleteRequest>,
}

impl RecordingAutocompleteClient {
    #[must_use]
    pub fn requests(&self) -> &[AutocompleteRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<AutocompleteRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl AutocompleteClient for RecordingAutocompleteClient {
    fn get_matches(&mut self, request: AutocompleteRequest) {
        self.requests.push(request);
    }
}
