#![forbid(unsafe_code)]

//! Breakpoints and the shared breakpoint store.
//!
//! The store is the single owner of breakpoint state. It is mutated only
//! through the explicit add/remove/set-options transitions below; every
//! other component reads it.
//!
//! # Lifecycle
//!
//! ```text
//!            begin_add               complete_add
//!  (absent) ───────────▶ loading ─────────────────▶ settled
//!      ▲                    │ fail_add                 │ begin_remove
//!      └────────────────────┘                          ▼
//!      ▲                 complete_remove            loading
//!      └───────────────────────────────────────────────┤
//!                                   fail_remove        │
//!                        settled ◀─────────────────────┘
//! ```
//!
//! While `loading` is set, every further mutation of that breakpoint is
//! refused: round-trips are never re-entered.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::location::{Location, SourceId};

/// User-editable breakpoint options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointOptions {
    /// Pause only when this expression is truthy.
    pub condition: Option<String>,
    /// Log this expression instead of pausing (log point).
    pub log_value: Option<String>,
}

impl BreakpointOptions {
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    #[must_use]
    pub fn with_log_value(mut self, log_value: impl Into<String>) -> Self {
        self.log_value = Some(log_value.into());
        self
    }

    /// Current value of one field.
    #[must_use]
    pub fn get(&self, field: OptionField) -> Option<&str> {
        match field {
            OptionField::Condition => self.condition.as_deref(),
            OptionField::LogValue => self.log_value.as_deref(),
        }
    }

    /// Copy of these options with one field replaced, the other untouched.
    #[must_use]
    pub fn merged(&self, field: OptionField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        match field {
            OptionField::Condition => next.condition = Some(value.into()),
            OptionField::LogValue => next.log_value = Some(value.into()),
        }
        next
    }
}

/// Which option an inline editor writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionField {
    Condition,
    LogValue,
}

impl OptionField {
    /// `LogValue` for log points, `Condition` otherwise.
    #[must_use]
    pub const fn for_log_point(log_point: bool) -> Self {
        if log_point {
            Self::LogValue
        } else {
            Self::Condition
        }
    }
}

/// A pause point anchored to a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub location: Location,
    pub options: BreakpointOptions,
    /// An add or remove round-trip is in flight.
    pub loading: bool,
}

/// Result of [`BreakpointStore::set_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOptionsOutcome {
    /// An existing breakpoint now carries the new options.
    Updated,
    /// No breakpoint existed; a loading one was added with the options.
    Added,
    /// The breakpoint at that location is loading.
    Ignored,
}

/// Result of [`BreakpointStore::complete_add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteAddOutcome {
    /// The placeholder settled at the placed location.
    Settled,
    /// The placed location already held another breakpoint. The placeholder
    /// was dropped and the existing entry kept as is.
    Merged,
    /// No placeholder was pending at the requested location.
    Unknown,
}

impl CompleteAddOutcome {
    /// Whether the store changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

type LineColumn = (u32, u32);

/// All breakpoints, at most one per `(source, line, column)`.
#[derive(Debug, Clone, Default)]
pub struct BreakpointStore {
    by_source: AHashMap<SourceId, BTreeMap<LineColumn, Breakpoint>>,
}

impl BreakpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, location: &Location) -> Option<&Breakpoint> {
        self.at(&location.source_id, location.line, location.column)
    }

    /// Exact lookup by parts, without building a [`Location`].
    #[must_use]
    pub fn at(&self, source_id: &SourceId, line: u32, column: u32) -> Option<&Breakpoint> {
        self.by_source.get(source_id)?.get(&(line, column))
    }

    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.get(location).is_some()
    }

    /// Breakpoints of one source ordered by line, then column.
    pub fn for_source<'a>(
        &'a self,
        source_id: &SourceId,
    ) -> impl Iterator<Item = &'a Breakpoint> + 'a {
        self.by_source
            .get(source_id)
            .into_iter()
            .flat_map(|lines| lines.values())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a loading placeholder at `location`.
    ///
    /// Returns `false` if a breakpoint already exists there.
    pub fn begin_add(&mut self, location: Location, options: BreakpointOptions) -> bool {
        if self.contains(&location) {
            return false;
        }
        self.log_transition("begin_add", &location);
        self.insert(Breakpoint {
            location,
            options,
            loading: true,
        });
        true
    }

    /// Settle an add. `actual` is where the service placed the breakpoint;
    /// it may have slid to another column (or line) than `requested`.
    ///
    /// If `actual` already holds a different breakpoint, that one wins: its
    /// options and `loading` flag are left alone and the placeholder is
    /// dropped.
    pub fn complete_add(&mut self, requested: &Location, actual: Location) -> CompleteAddOutcome {
        if !self.get(requested).is_some_and(|bp| bp.loading) {
            return CompleteAddOutcome::Unknown;
        }
        if actual != *requested && self.contains(&actual) {
            self.take(requested);
            self.log_transition("merge_add", &actual);
            return CompleteAddOutcome::Merged;
        }
        let Some(mut breakpoint) = self.take(requested) else {
            return CompleteAddOutcome::Unknown;
        };
        self.log_transition("complete_add", &actual);
        breakpoint.location = actual;
        breakpoint.loading = false;
        self.insert(breakpoint);
        CompleteAddOutcome::Settled
    }

    /// Drop the placeholder of a failed add.
    pub fn fail_add(&mut self, requested: &Location) -> bool {
        if !self.get(requested).is_some_and(|bp| bp.loading) {
            return false;
        }
        self.log_transition("fail_add", requested);
        self.take(requested).is_some()
    }

    /// Mark a settled breakpoint as being removed.
    ///
    /// Returns `false` if absent or already loading.
    pub fn begin_remove(&mut self, location: &Location) -> bool {
        match self.get_mut(location) {
            Some(bp) if !bp.loading => {
                bp.loading = true;
                self.log_transition("begin_remove", location);
                true
            }
            _ => false,
        }
    }

    /// Delete a breakpoint once the service confirmed the removal.
    pub fn complete_remove(&mut self, location: &Location) -> Option<Breakpoint> {
        let removed = self.take(location);
        if removed.is_some() {
            self.log_transition("complete_remove", location);
        }
        removed
    }

    /// Restore a breakpoint whose removal failed.
    pub fn fail_remove(&mut self, location: &Location) -> bool {
        match self.get_mut(location) {
            Some(bp) if bp.loading => {
                bp.loading = false;
                self.log_transition("fail_remove", location);
                true
            }
            _ => false,
        }
    }

    /// Replace the options at `location`, adding a breakpoint if none exists.
    pub fn set_options(
        &mut self,
        location: &Location,
        options: BreakpointOptions,
    ) -> SetOptionsOutcome {
        match self.get_mut(location) {
            Some(bp) if bp.loading => SetOptionsOutcome::Ignored,
            Some(bp) => {
                bp.options = options;
                self.log_transition("set_options", location);
                SetOptionsOutcome::Updated
            }
            None => {
                self.begin_add(location.clone(), options);
                SetOptionsOutcome::Added
            }
        }
    }

    fn get_mut(&mut self, location: &Location) -> Option<&mut Breakpoint> {
        self.by_source
            .get_mut(&location.source_id)?
            .get_mut(&(location.line, location.column))
    }

    fn insert(&mut self, breakpoint: Breakpoint) {
        let key = (breakpoint.location.line, breakpoint.location.column);
        self.by_source
            .entry(breakpoint.location.source_id.clone())
            .or_default()
            .insert(key, breakpoint);
    }

    fn take(&mut self, location: &Location) -> Option<Breakpoint> {
        let lines = self.by_source.get_mut(&location.source_id)?;
        let removed = lines.remove(&(location.line, location.column));
        if lines.is_empty() {
            self.by_source.remove(&location.source_id);
        }
        removed
    }

    #[cfg(feature = "tracing")]
    fn log_transition(&self, transition: &str, location: &Location) {
        tracing::debug!(
            target: "srcdbg.breakpoints",
            transition,
            location = %location,
            total = self.len(),
            "breakpoint store transition"
        );
    }

    #[cfg(not(feature = "tracing"))]
    fn log_transition(&self, _transition: &str, _location: &Location) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(column: u32) -> Location {
        Location::new("foo.js", 3, column)
    }

    #[test]
    fn add_round_trip() {
        let mut store = BreakpointStore::new();
        assert!(store.begin_add(loc(5), BreakpointOptions::default()));
        assert!(store.get(&loc(5)).is_some_and(|bp| bp.loading));
        assert!(!store.begin_add(loc(5), BreakpointOptions::default()));

        assert_eq!(store.complete_add(&loc(5), loc(5)), CompleteAddOutcome::Settled);
        assert_eq!(store.complete_add(&loc(5), loc(5)), CompleteAddOutcome::Unknown);
        let bp = store.get(&loc(5)).expect("settled breakpoint");
        assert!(!bp.loading);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn complete_add_rekeys_slid_breakpoint() {
        let mut store = BreakpointStore::new();
        store.begin_add(loc(5), BreakpointOptions::default().with_condition("x"));
        assert_eq!(store.complete_add(&loc(5), loc(8)), CompleteAddOutcome::Settled);
        assert!(store.get(&loc(5)).is_none());
        let bp = store.get(&loc(8)).expect("slid breakpoint");
        assert_eq!(bp.location, loc(8));
        assert_eq!(bp.options.condition.as_deref(), Some("x"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_sliding_onto_existing_breakpoint_keeps_it() {
        let mut store = BreakpointStore::new();
        let kept = BreakpointOptions::default().with_condition("keep");
        store.begin_add(loc(8), kept.clone());
        store.complete_add(&loc(8), loc(8));
        assert!(store.begin_remove(&loc(8)));

        store.begin_add(loc(5), BreakpointOptions::default());
        assert_eq!(store.complete_add(&loc(5), loc(8)), CompleteAddOutcome::Merged);
        assert!(CompleteAddOutcome::Merged.changed());

        assert_eq!(store.len(), 1);
        assert!(store.get(&loc(5)).is_none());
        let bp = store.get(&loc(8)).expect("existing breakpoint");
        assert_eq!(bp.options, kept);
        assert!(bp.loading, "removal still in flight");
        assert!(!store.begin_remove(&loc(8)));
    }

    #[test]
    fn fail_add_drops_placeholder_only_while_loading() {
        let mut store = BreakpointStore::new();
        store.begin_add(loc(5), BreakpointOptions::default());
        assert!(store.fail_add(&loc(5)));
        assert!(store.is_empty());

        store.begin_add(loc(6), BreakpointOptions::default());
        store.complete_add(&loc(6), loc(6));
        assert!(!store.fail_add(&loc(6)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_round_trip_and_reentrancy() {
        let mut store = BreakpointStore::new();
        store.begin_add(loc(5), BreakpointOptions::default());
        assert!(!store.begin_remove(&loc(5)), "loading add refuses removal");
        store.complete_add(&loc(5), loc(5));

        assert!(store.begin_remove(&loc(5)));
        assert!(!store.begin_remove(&loc(5)));
        assert!(store.fail_remove(&loc(5)));
        assert!(!store.get(&loc(5)).expect("restored").loading);

        store.begin_remove(&loc(5));
        assert!(store.complete_remove(&loc(5)).is_some());
        assert!(store.is_empty());
        assert!(store.complete_remove(&loc(5)).is_none());
    }

    #[test]
    fn set_options_updates_adds_and_respects_loading() {
        let mut store = BreakpointStore::new();
        let opts = BreakpointOptions::default().with_condition("a > 1");
        assert_eq!(store.set_options(&loc(2), opts.clone()), SetOptionsOutcome::Added);
        assert_eq!(
            store.set_options(&loc(2), BreakpointOptions::default()),
            SetOptionsOutcome::Ignored
        );
        store.complete_add(&loc(2), loc(2));
        assert_eq!(store.get(&loc(2)).map(|bp| &bp.options), Some(&opts));

        let log = opts.merged(OptionField::LogValue, "a");
        assert_eq!(store.set_options(&loc(2), log.clone()), SetOptionsOutcome::Updated);
        assert_eq!(store.get(&loc(2)).map(|bp| &bp.options), Some(&log));
    }

    #[test]
    fn merged_keeps_other_field() {
        let opts = BreakpointOptions::default()
            .with_condition("c")
            .with_log_value("l");
        let next = opts.merged(OptionField::Condition, "d");
        assert_eq!(next.get(OptionField::Condition), Some("d"));
        assert_eq!(next.get(OptionField::LogValue), Some("l"));
        assert_eq!(OptionField::for_log_point(true), OptionField::LogValue);
        assert_eq!(OptionField::for_log_point(false), OptionField::Condition);
    }

    #[test]
    fn for_source_is_ordered_and_scoped() {
        let mut store = BreakpointStore::new();
        store.begin_add(Location::new("foo.js", 4, 1), BreakpointOptions::default());
        store.begin_add(Location::new("foo.js", 2, 9), BreakpointOptions::default());
        store.begin_add(Location::new("foo.js", 2, 3), BreakpointOptions::default());
        store.begin_add(Location::new("bar.js", 1, 0), BreakpointOptions::default());

        let cols: Vec<(u32, u32)> = store
            .for_source(&SourceId::new("foo.js"))
            .map(|bp| (bp.location.line, bp.location.column))
            .collect();
        assert_eq!(cols, [(2, 3), (2, 9), (4, 1)]);
        assert_eq!(store.for_source(&SourceId::new("none.js")).count(), 0);
        assert_eq!(store.len(), 4);
    }
}
