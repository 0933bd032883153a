#![forbid(unsafe_code)]

//! Call-site marker lifecycle.
//!
//! Each visible call site owns at most one editor marker. [`CallSiteMarker`]
//! is the per-call-site controller; [`MarkerReconciler`] is the ownership
//! record `{span -> CallSiteMarker}` that mounts, updates, and unmounts
//! instances as the resolved call sites of the active source change.
//!
//! # Rules
//!
//! - Mount: no editor, nothing. Otherwise mark when a breakpoint is present
//!   or call sites are shown; style `call-site-bp` with a breakpoint,
//!   `call-site` without.
//! - Editor instance changed: clear, then mark again from current props.
//! - Breakpoint presence changed: clear, then mark again from current props.
//! - Show toggled on with no breakpoint and no live marker: mark plain.
//! - Show toggled off with no breakpoint: clear.
//! - Show toggled off with a breakpoint: untouched.
//! - Any other prop change: no marker work.
//! - Unmount: clear whatever is live.
//!
//! Creating always clears the previous marker first, so at most one marker
//! per instance is ever live.

use ahash::{AHashMap, AHashSet};
use srcdbg_core::{CallSite, MarkerStyle, Rejection, ResolvedCallSite, Span};

use crate::editor::{Editor, EditorId, MarkerId};

/// Inputs of one call-site marker instance besides the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerProps {
    pub has_breakpoint: bool,
    pub show_call_site: bool,
}

impl MarkerProps {
    fn wants_marker(self) -> bool {
        self.has_breakpoint || self.show_call_site
    }

    fn style(self) -> MarkerStyle {
        MarkerStyle::for_breakpoint(self.has_breakpoint)
    }
}

/// A marker currently shown by an editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveMarker {
    pub editor: EditorId,
    pub marker: MarkerId,
    pub style: MarkerStyle,
}

/// Marker controller for one call site.
#[derive(Debug, Clone)]
pub struct CallSiteMarker {
    call_site: CallSite,
    props: MarkerProps,
    /// Props the marker state last reflected in an editor. Updates without
    /// an editor leave this behind so the next editor update catches up.
    applied: MarkerProps,
    editor: Option<EditorId>,
    live: Option<LiveMarker>,
}

impl CallSiteMarker {
    /// First render of a call site.
    pub fn mount<E: Editor + ?Sized>(
        call_site: CallSite,
        props: MarkerProps,
        editor: Option<&mut E>,
    ) -> Self {
        let mut this = Self {
            call_site,
            props,
            applied: props,
            editor: None,
            live: None,
        };
        match editor {
            Some(editor) => {
                this.editor = Some(editor.id());
                if props.wants_marker() {
                    this.create(editor);
                }
            }
            None => log_missing_editor("mount"),
        }
        this
    }

    /// Apply new props and the current editor.
    pub fn update<E: Editor + ?Sized>(&mut self, props: MarkerProps, editor: Option<&mut E>) {
        self.props = props;
        let Some(editor) = editor else {
            if self.applied != props {
                log_missing_editor("update");
            }
            return;
        };
        let previous = std::mem::replace(&mut self.applied, props);

        if self.editor != Some(editor.id()) {
            self.editor = Some(editor.id());
            self.replace(editor);
            return;
        }

        if previous.has_breakpoint != props.has_breakpoint {
            self.replace(editor);
        } else if previous.show_call_site != props.show_call_site && !props.has_breakpoint {
            if props.show_call_site {
                if self.live.is_none() {
                    self.create(editor);
                }
            } else {
                self.clear(editor);
            }
        }
    }

    /// Tear down, clearing any live marker.
    pub fn unmount<E: Editor + ?Sized>(mut self, editor: Option<&mut E>) {
        match editor {
            Some(editor) => self.clear(editor),
            None if self.live.is_some() => log_missing_editor("unmount"),
            None => {}
        }
    }

    #[must_use]
    pub fn call_site(&self) -> &CallSite {
        &self.call_site
    }

    #[must_use]
    pub fn props(&self) -> MarkerProps {
        self.props
    }

    #[must_use]
    pub fn live(&self) -> Option<LiveMarker> {
        self.live
    }

    fn replace<E: Editor + ?Sized>(&mut self, editor: &mut E) {
        self.clear(editor);
        if self.props.wants_marker() {
            self.create(editor);
        }
    }

    fn create<E: Editor + ?Sized>(&mut self, editor: &mut E) {
        self.clear(editor);
        let style = self.props.style();
        let marker = editor.mark_text(style, &self.call_site.location);
        tracing::debug!(
            target: "srcdbg.markers",
            span = ?self.call_site.location,
            style = style.class_name(),
            marker = marker.0,
            "marker created"
        );
        self.live = Some(LiveMarker {
            editor: editor.id(),
            marker,
            style,
        });
    }

    /// Clear the live marker. A marker made by a previous editor instance
    /// died with that instance and is only forgotten.
    fn clear<E: Editor + ?Sized>(&mut self, editor: &mut E) {
        let Some(live) = self.live.take() else {
            return;
        };
        if live.editor == editor.id() {
            editor.clear_marker(live.marker);
            tracing::debug!(
                target: "srcdbg.markers",
                span = ?self.call_site.location,
                marker = live.marker.0,
                "marker cleared"
            );
        }
    }
}

fn log_missing_editor(op: &'static str) {
    tracing::debug!(
        target: "srcdbg.markers",
        op,
        reason = Rejection::MissingEditorBinding.as_str(),
        "marker operation skipped"
    );
}

/// Ownership record of every call-site marker instance.
#[derive(Debug, Clone, Default)]
pub struct MarkerReconciler {
    instances: AHashMap<Span, CallSiteMarker>,
}

impl MarkerReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring instances in line with `resolved`: unmount vanished call sites,
    /// update surviving ones, mount new ones.
    pub fn reconcile<E: Editor + ?Sized>(
        &mut self,
        resolved: &[ResolvedCallSite<'_>],
        show_call_sites: bool,
        mut editor: Option<&mut E>,
    ) {
        let wanted: AHashSet<&Span> = resolved
            .iter()
            .map(|entry| &entry.call_site.location)
            .collect();
        let mut stale: Vec<Span> = self
            .instances
            .keys()
            .filter(|span| !wanted.contains(span))
            .cloned()
            .collect();
        stale.sort();
        for span in stale {
            if let Some(instance) = self.instances.remove(&span) {
                instance.unmount(editor.as_deref_mut());
            }
        }

        for entry in resolved {
            let props = MarkerProps {
                has_breakpoint: entry.breakpoint.is_some(),
                show_call_site: show_call_sites,
            };
            let span = &entry.call_site.location;
            match self.instances.get_mut(span) {
                Some(instance) => instance.update(props, editor.as_deref_mut()),
                None => {
                    let instance = CallSiteMarker::mount(
                        entry.call_site.clone(),
                        props,
                        editor.as_deref_mut(),
                    );
                    self.instances.insert(span.clone(), instance);
                }
            }
        }
    }

    /// Unmount every instance.
    pub fn clear_all<E: Editor + ?Sized>(&mut self, mut editor: Option<&mut E>) {
        let mut spans: Vec<Span> = self.instances.keys().cloned().collect();
        spans.sort();
        for span in spans {
            if let Some(instance) = self.instances.remove(&span) {
                instance.unmount(editor.as_deref_mut());
            }
        }
    }

    #[must_use]
    pub fn get(&self, span: &Span) -> Option<&CallSiteMarker> {
        self.instances.get(span)
    }

    /// Number of mounted instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of instances with a live marker.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.instances
            .values()
            .filter(|instance| instance.live.is_some())
            .count()
    }
}
