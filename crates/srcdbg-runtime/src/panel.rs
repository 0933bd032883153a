#![forbid(unsafe_code)]

//! Inline breakpoint condition / log-value editor.
//!
//! [`ConditionPanel`] is an explicit finite-state object. At most one
//! session exists; it is bound to one breakpoint location and owns a line
//! widget in the editor, the scroll-parent subscription that keeps the
//! widget horizontally in place, and a debounced autocomplete request.
//!
//! # State Machine
//!
//! ```text
//!               open                         Enter / blur (commit)
//!  ┌────────┐ ───────▶ ┌──────────────┐ ───────────────────────────▶ Closed
//!  │ Closed │          │ Open(session)│ ───────────────────────────▶ Closed
//!  └────────┘ ◀─┐      └──────────────┘        Escape / close
//!               │         │        ▲
//!   resume      │  detach │        │ resume (source still active)
//!   (invalid)   │         ▼        │
//!               │      ┌──────────────┐
//!               └───── │  Suspended   │
//!                      └──────────────┘
//! ```
//!
//! `Suspended` is entered when the editor reinitialises under an open
//! session: the widget is gone but the location and typed input survive,
//! and the next render rebuilds the session against the new editor.
//!
//! # Autocomplete
//!
//! Input is debounced; when the window elapses [`ConditionPanel::poll`]
//! bumps a generation counter and issues one request tagged with it.
//! Results carrying any other generation are stale and dropped. Closing or
//! suspending cancels the pending debounce and bumps the generation, so
//! nothing issued before can land afterwards.

use srcdbg_core::{BreakpointOptions, Location, OptionField, Rejection, to_editor_line};
use web_time::{Duration, Instant};

use crate::client::{AutocompleteClient, AutocompleteRequest};
use crate::debounce::Debouncer;
use crate::editor::{Editor, EditorId, ScrollParentId, WidgetId};

/// Keys the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKey {
    Enter,
    Escape,
    Other,
}

/// The edit to apply when a session commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelCommit {
    pub location: Location,
    pub field: OptionField,
    pub value: String,
}

impl PanelCommit {
    /// `options` with the edited field replaced, the other field kept.
    #[must_use]
    pub fn apply_to(&self, options: &BreakpointOptions) -> BreakpointOptions {
        options.merged(self.field, self.value.as_str())
    }
}

/// Result of [`ConditionPanel::on_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Enter: the session closed and this edit should be applied.
    Commit(PanelCommit),
    /// Escape: the session closed, nothing to apply.
    Cancelled,
    /// Key not handled, or no open session.
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    location: Location,
    log_point: bool,
}

#[derive(Debug, Clone)]
struct Session {
    target: Target,
    input: String,
    cursor: usize,
    editor: EditorId,
    widget: WidgetId,
    scroll_parent: Option<ScrollParentId>,
    translate_x: i32,
}

#[derive(Debug, Clone, Default)]
enum PanelState {
    #[default]
    Closed,
    Open(Session),
    Suspended { target: Target, input: String },
}

/// The conditional breakpoint panel controller.
#[derive(Debug, Clone)]
pub struct ConditionPanel {
    state: PanelState,
    debounce: Debouncer<(String, usize)>,
    generation: u64,
    matches: Vec<String>,
}

impl Default for ConditionPanel {
    fn default() -> Self {
        Self::new(Duration::from_millis(srcdbg_core::config::DEFAULT_AUTOCOMPLETE_DEBOUNCE_MS))
    }
}

impl ConditionPanel {
    /// Panel whose autocomplete requests wait `debounce` after the last
    /// keystroke.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: PanelState::Closed,
            debounce: Debouncer::new(debounce),
            generation: 0,
            matches: Vec::new(),
        }
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce.set_window(debounce);
    }

    /// Open a session at `location`, pre-filled from `existing` options.
    ///
    /// Any previous session is closed first. Without an editor nothing
    /// happens.
    pub fn open<E: Editor + ?Sized>(
        &mut self,
        location: Location,
        log_point: bool,
        existing: Option<&BreakpointOptions>,
        editor: Option<&mut E>,
    ) -> bool {
        let Some(editor) = editor else {
            log_rejection("open", Rejection::MissingEditorBinding);
            return false;
        };
        self.close(Some(&mut *editor));

        let input = existing
            .and_then(|options| options.get(OptionField::for_log_point(log_point)))
            .unwrap_or_default()
            .to_owned();
        let target = Target {
            location,
            log_point,
        };
        self.mount(target, input, editor);
        true
    }

    /// Input changed: restart the debounce window.
    pub fn on_input(&mut self, text: impl Into<String>, cursor: usize, now: Instant) -> bool {
        let PanelState::Open(session) = &mut self.state else {
            return false;
        };
        session.input = text.into();
        session.cursor = cursor;
        self.debounce
            .schedule((session.input.clone(), session.cursor), now);
        true
    }

    /// Fire the debounced autocomplete request if its window has elapsed.
    pub fn poll<A: AutocompleteClient + ?Sized>(&mut self, now: Instant, client: &mut A) -> bool {
        if !self.is_open() {
            self.debounce.cancel();
            return false;
        }
        let Some((text, cursor)) = self.debounce.poll(now) else {
            return false;
        };
        self.generation += 1;
        tracing::debug!(
            target: "srcdbg.panel",
            generation = self.generation,
            cursor,
            "autocomplete request"
        );
        client.get_matches(AutocompleteRequest {
            generation: self.generation,
            text,
            cursor,
        });
        true
    }

    /// Deliver autocomplete results for the request tagged `generation`.
    pub fn receive_matches(
        &mut self,
        generation: u64,
        matches: Vec<String>,
    ) -> Result<(), Rejection> {
        if !self.is_open() || generation != self.generation {
            tracing::debug!(
                target: "srcdbg.panel",
                generation,
                current = self.generation,
                reason = Rejection::StaleAutocompleteResult.as_str(),
                "autocomplete result dropped"
            );
            return Err(Rejection::StaleAutocompleteResult);
        }
        self.matches = matches;
        Ok(())
    }

    pub fn on_key<E: Editor + ?Sized>(
        &mut self,
        key: PanelKey,
        editor: Option<&mut E>,
    ) -> KeyOutcome {
        if !self.is_open() {
            return KeyOutcome::Unhandled;
        }
        match key {
            PanelKey::Enter => self
                .commit(editor)
                .map_or(KeyOutcome::Unhandled, KeyOutcome::Commit),
            PanelKey::Escape => {
                self.close(editor);
                KeyOutcome::Cancelled
            }
            PanelKey::Other => KeyOutcome::Unhandled,
        }
    }

    /// Focus left the input. Saves, like Enter.
    pub fn on_blur<E: Editor + ?Sized>(&mut self, editor: Option<&mut E>) -> Option<PanelCommit> {
        self.commit(editor)
    }

    /// Close the session (or forget a suspended one) without committing.
    pub fn close<E: Editor + ?Sized>(&mut self, editor: Option<&mut E>) -> bool {
        match std::mem::take(&mut self.state) {
            PanelState::Closed => false,
            PanelState::Open(session) => {
                self.teardown(&session, editor);
                tracing::debug!(
                    target: "srcdbg.panel",
                    location = %session.target.location,
                    "panel closed"
                );
                true
            }
            PanelState::Suspended { target, .. } => {
                self.cancel_pending();
                tracing::debug!(
                    target: "srcdbg.panel",
                    location = %target.location,
                    "suspended panel dropped"
                );
                true
            }
        }
    }

    /// The scroll parent moved: follow its horizontal offset.
    pub fn on_scroll<E: Editor + ?Sized>(&mut self, editor: &mut E) -> bool {
        let PanelState::Open(session) = &mut self.state else {
            return false;
        };
        if session.editor != editor.id() {
            return false;
        }
        let Some(parent) = session.scroll_parent else {
            return false;
        };
        session.translate_x = editor.scroll_left(parent);
        editor.set_widget_offset(session.widget, session.translate_x);
        true
    }

    /// The editor is being reinitialised. An open session loses its widget
    /// but stays logically open until [`resume`](Self::resume).
    pub fn detach<E: Editor + ?Sized>(&mut self, editor: Option<&mut E>) -> bool {
        match std::mem::take(&mut self.state) {
            PanelState::Open(session) => {
                self.teardown(&session, editor);
                tracing::debug!(
                    target: "srcdbg.panel",
                    location = %session.target.location,
                    "panel suspended"
                );
                self.state = PanelState::Suspended {
                    target: session.target,
                    input: session.input,
                };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Rebuild a suspended session against `editor`, or drop it when its
    /// location is no longer valid.
    pub fn resume<E: Editor + ?Sized>(&mut self, editor: &mut E, still_valid: bool) -> bool {
        match std::mem::take(&mut self.state) {
            PanelState::Suspended { target, input } if still_valid => {
                tracing::debug!(
                    target: "srcdbg.panel",
                    location = %target.location,
                    "panel resumed"
                );
                self.mount(target, input, editor);
                true
            }
            PanelState::Suspended { target, .. } => {
                tracing::debug!(
                    target: "srcdbg.panel",
                    location = %target.location,
                    "suspended panel no longer valid"
                );
                false
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Location of the open or suspended session.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.target().map(|target| &target.location)
    }

    #[must_use]
    pub fn is_log_point(&self) -> bool {
        self.target().is_some_and(|target| target.log_point)
    }

    /// Current input of the open or suspended session.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        match &self.state {
            PanelState::Closed => None,
            PanelState::Open(session) => Some(&session.input),
            PanelState::Suspended { input, .. } => Some(input),
        }
    }

    #[must_use]
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    #[must_use]
    pub fn translate_x(&self) -> Option<i32> {
        match &self.state {
            PanelState::Open(session) => Some(session.translate_x),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open(_))
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self.state, PanelState::Suspended { .. })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, PanelState::Closed)
    }

    /// An autocomplete request is waiting for its debounce window.
    #[must_use]
    pub fn has_pending_request(&self) -> bool {
        self.debounce.is_pending()
    }

    /// When the pending autocomplete request fires, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Generation of the latest issued request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn target(&self) -> Option<&Target> {
        match &self.state {
            PanelState::Closed => None,
            PanelState::Open(session) => Some(&session.target),
            PanelState::Suspended { target, .. } => Some(target),
        }
    }

    fn commit<E: Editor + ?Sized>(&mut self, editor: Option<&mut E>) -> Option<PanelCommit> {
        let PanelState::Open(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        self.teardown(&session, editor);
        let commit = PanelCommit {
            field: OptionField::for_log_point(session.target.log_point),
            location: session.target.location,
            value: session.input,
        };
        tracing::debug!(
            target: "srcdbg.panel",
            location = %commit.location,
            field = ?commit.field,
            "panel committed"
        );
        Some(commit)
    }

    fn mount<E: Editor + ?Sized>(&mut self, target: Target, input: String, editor: &mut E) {
        let widget = editor.add_line_widget(to_editor_line(target.location.line));
        let scroll_parent = editor.scroll_parent(widget);
        let mut translate_x = 0;
        if let Some(parent) = scroll_parent {
            editor.watch_scroll(parent);
            translate_x = editor.scroll_left(parent);
            editor.set_widget_offset(widget, translate_x);
        }
        tracing::debug!(
            target: "srcdbg.panel",
            location = %target.location,
            log_point = target.log_point,
            widget = widget.0,
            "panel opened"
        );
        self.state = PanelState::Open(Session {
            cursor: input.len(),
            target,
            input,
            editor: editor.id(),
            widget,
            scroll_parent,
            translate_x,
        });
    }

    /// Remove the session's editor artifacts and invalidate autocomplete.
    fn teardown<E: Editor + ?Sized>(&mut self, session: &Session, editor: Option<&mut E>) {
        self.cancel_pending();
        match editor {
            Some(editor) if editor.id() == session.editor => {
                if let Some(parent) = session.scroll_parent {
                    editor.unwatch_scroll(parent);
                }
                editor.clear_line_widget(session.widget);
            }
            Some(_) => {}
            None => log_rejection("teardown", Rejection::MissingEditorBinding),
        }
    }

    fn cancel_pending(&mut self) {
        self.debounce.cancel();
        self.generation += 1;
        self.matches.clear();
    }
}

fn log_rejection(op: &'static str, reason: Rejection) {
    tracing::debug!(
        target: "srcdbg.panel",
        op,
        reason = reason.as_str(),
        "panel operation skipped"
    );
}
