#![forbid(unsafe_code)]

//! The editor seam.
//!
//! The runtime never touches an editor widget directly. Everything it needs
//! (text markers, line widgets, scroll tracking, coordinate translation,
//! line text) goes through [`Editor`]. Handles are plain ids owned by the
//! editor; an id from one editor instance means nothing to another.

use std::fmt;
use std::rc::Rc;

use srcdbg_core::{EditorPosition, MarkerStyle, Span};

/// Identity of one editor instance. Changes when the editor reinitialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(pub u64);

/// Handle to a text marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// Handle to a widget inserted below an editor line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u64);

/// Handle to a horizontally scrolling ancestor of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollParentId(pub u64);

/// Lazily evaluated text of one editor line.
///
/// Evaluated when called, not when created: the line may shift between a
/// toggle and the asynchronous add completing.
#[derive(Clone)]
pub struct LineTextFn(Rc<dyn Fn() -> Option<String>>);

impl LineTextFn {
    pub fn new(f: impl Fn() -> Option<String> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Accessor that never yields text.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(|| None)
    }

    /// Current text of the line.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        (self.0)()
    }
}

impl fmt::Debug for LineTextFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LineTextFn(..)")
    }
}

/// Editor operations the debugger core relies on.
pub trait Editor {
    /// Identity of this editor instance.
    fn id(&self) -> EditorId;

    /// Mark `span` with `style` and return the new marker.
    fn mark_text(&mut self, style: MarkerStyle, span: &Span) -> MarkerId;

    /// Remove a marker. Unknown ids are ignored.
    fn clear_marker(&mut self, marker: MarkerId);

    /// Insert a widget below the 0-based `editor_line`.
    fn add_line_widget(&mut self, editor_line: u32) -> WidgetId;

    /// Remove a line widget. Unknown ids are ignored.
    fn clear_line_widget(&mut self, widget: WidgetId);

    /// Nearest horizontally scrolling ancestor of `widget`, if any.
    fn scroll_parent(&self, widget: WidgetId) -> Option<ScrollParentId>;

    /// Start delivering scroll events of `parent` to the host.
    fn watch_scroll(&mut self, parent: ScrollParentId);

    /// Stop delivering scroll events of `parent`.
    fn unwatch_scroll(&mut self, parent: ScrollParentId);

    /// Current horizontal scroll offset of `parent`, in pixels.
    fn scroll_left(&self, parent: ScrollParentId) -> i32;

    /// Translate `widget` horizontally by `translate_x` pixels.
    fn set_widget_offset(&mut self, widget: WidgetId, translate_x: i32);

    /// Translate raw click coordinates into an editor position.
    fn position_from_coords(&self, x: f64, y: f64) -> Option<EditorPosition>;

    /// Lazy accessor for the text of the 0-based `editor_line`.
    fn line_text(&self, editor_line: u32) -> LineTextFn;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn line_text_is_read_at_call_time() {
        let text = Rc::new(RefCell::new(String::from("foo()")));
        let shared = Rc::clone(&text);
        let accessor = LineTextFn::new(move || Some(shared.borrow().clone()));
        *text.borrow_mut() = String::from("bar()");
        assert_eq!(accessor.get().as_deref(), Some("bar()"));
        assert_eq!(LineTextFn::empty().get(), None);
        assert_eq!(format!("{accessor:?}"), "LineTextFn(..)");
    }
}
