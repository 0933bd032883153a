#![forbid(unsafe_code)]

//! End-to-end flows through `SourceDebugger`: tabs, toggling, service
//! completions, the conditional panel and editor reinitialisation.
//!
//! Run:
//!   cargo test -p srcdbg-runtime --test debugger_flow

use std::time::Duration;

use srcdbg_core::{
    CallSite, CompleteAddOutcome, DebuggerConfig, Location, MarkerStyle, Rejection, SourceId, Span,
};
use srcdbg_runtime::testing::{
    BreakpointCall, RecordingAutocompleteClient, RecordingBreakpointClient, RecordingEditor,
};
use srcdbg_runtime::{KeyOutcome, PanelKey, SourceDebugger, ToggleOutcome};
use web_time::Instant;

type Debugger =
    SourceDebugger<RecordingEditor, RecordingBreakpointClient, RecordingAutocompleteClient>;

const BASE: &str = "http://localhost:8000/static/";

fn url(name: &str) -> String {
    format!("{BASE}{name}")
}

fn debugger(config: DebuggerConfig) -> Debugger {
    let mut dbg = Debugger::new(
        config,
        RecordingBreakpointClient::default(),
        RecordingAutocompleteClient::default(),
    );
    for name in ["foo.js", "bar.js", "bazz.js"] {
        dbg.new_source(name, url(name));
    }
    dbg.attach_editor(RecordingEditor::new(1));
    dbg
}

fn select(dbg: &mut Debugger, name: &str) {
    dbg.select_location(&SourceId::new(name))
        .expect("registered source");
}

fn active(dbg: &Debugger) -> Option<&str> {
    dbg.tabs().active().map(SourceId::as_str)
}

// ============================================================================
// Tabs
// ============================================================================

#[test]
fn closing_leading_tabs_keeps_active() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    select(&mut dbg, "bar.js");
    select(&mut dbg, "bazz.js");
    dbg.close_tabs([url("foo.js"), url("bar.js")]);
    assert_eq!(active(&dbg), Some("bazz.js"));
    assert_eq!(dbg.tabs().len(), 1);
}

#[test]
fn closing_trailing_tabs_falls_back_left() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    select(&mut dbg, "bar.js");
    select(&mut dbg, "bazz.js");
    dbg.close_tabs([url("bar.js"), url("bazz.js")]);
    assert_eq!(active(&dbg), Some("foo.js"));
    assert_eq!(dbg.tabs().len(), 1);
}

#[test]
fn closing_every_tab_clears_active() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    select(&mut dbg, "bar.js");
    dbg.close_tabs([url("foo.js"), url("bar.js")]);
    assert_eq!(active(&dbg), None);
    assert!(dbg.tabs().is_empty());
}

#[test]
fn closing_active_middle_tab_selects_right_neighbour() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    select(&mut dbg, "bar.js");
    select(&mut dbg, "bazz.js");
    select(&mut dbg, "bar.js");
    assert!(dbg.close_tab(&url("bar.js")));
    assert_eq!(active(&dbg), Some("bazz.js"));
}

#[test]
fn selecting_closed_tab_is_ignored() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    assert_eq!(
        dbg.select_tab(&SourceId::new("bar.js")),
        Err(Rejection::InvalidSelection)
    );
    assert_eq!(active(&dbg), Some("foo.js"));
}

// ============================================================================
// Breakpoints
// ============================================================================

#[test]
fn toggling_loading_breakpoint_is_noop() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    assert!(matches!(dbg.toggle_breakpoint(1, 4), ToggleOutcome::Added(_)));
    let before = dbg.breakpoints().len();

    assert_eq!(
        dbg.toggle_breakpoint(1, 4),
        ToggleOutcome::Ignored(Rejection::ReentrantToggle)
    );
    assert_eq!(dbg.breakpoints().len(), before);
    assert!(
        dbg.breakpoints()
            .get(&Location::new("foo.js", 2, 4))
            .is_some_and(|bp| bp.loading)
    );
    assert_eq!(dbg.breakpoint_client().calls().len(), 1);
}

#[test]
fn slid_breakpoint_is_removed_at_recorded_column() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    dbg.set_call_sites("foo.js", vec![CallSite::new(Span::on_line("foo.js", 2, 5, 10))]);

    let requested = Location::new("foo.js", 2, 5);
    assert_eq!(dbg.toggle_breakpoint(1, 5), ToggleOutcome::Added(requested.clone()));
    assert_eq!(
        dbg.breakpoint_added(&requested, Location::new("foo.js", 2, 8)),
        CompleteAddOutcome::Settled
    );

    let slid = Location::new("foo.js", 2, 8);
    assert_eq!(dbg.toggle_breakpoint(1, 6), ToggleOutcome::Removed(slid.clone()));
    assert!(matches!(
        dbg.breakpoint_client().calls().last(),
        Some(BreakpointCall::Remove(loc)) if *loc == slid
    ));
    assert!(dbg.breakpoint_removed(&slid));
    assert!(dbg.breakpoints().is_empty());
}

#[test]
fn add_placed_on_breakpoint_being_removed_keeps_removal_pending() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    let occupied = Location::new("foo.js", 2, 8);
    dbg.toggle_breakpoint(1, 8);
    dbg.breakpoint_added(&occupied, occupied.clone());
    assert_eq!(dbg.toggle_breakpoint(1, 8), ToggleOutcome::Removed(occupied.clone()));

    let requested = Location::new("foo.js", 2, 5);
    assert_eq!(dbg.toggle_breakpoint(1, 5), ToggleOutcome::Added(requested.clone()));
    assert_eq!(
        dbg.breakpoint_added(&requested, occupied.clone()),
        CompleteAddOutcome::Merged
    );
    assert_eq!(dbg.breakpoints().len(), 1);
    assert!(dbg.breakpoints().get(&occupied).is_some_and(|bp| bp.loading));
    assert_eq!(
        dbg.toggle_breakpoint(1, 8),
        ToggleOutcome::Ignored(Rejection::ReentrantToggle)
    );

    assert!(dbg.breakpoint_removed(&occupied));
    assert!(dbg.breakpoints().is_empty());
}

#[test]
fn failed_add_and_remove_roll_back() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    let loc = Location::new("foo.js", 3, 0);

    dbg.toggle_breakpoint(2, 0);
    assert!(dbg.breakpoint_add_failed(&loc));
    assert!(dbg.breakpoints().is_empty());

    dbg.toggle_breakpoint(2, 0);
    dbg.breakpoint_added(&loc, loc.clone());
    assert_eq!(dbg.toggle_breakpoint(2, 0), ToggleOutcome::Removed(loc.clone()));
    assert!(dbg.breakpoint_remove_failed(&loc));
    assert!(dbg.breakpoints().get(&loc).is_some_and(|bp| !bp.loading));
}

#[test]
fn markers_follow_breakpoints_and_toggle() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    dbg.set_call_sites(
        "foo.js",
        vec![
            CallSite::new(Span::on_line("foo.js", 2, 0, 4)),
            CallSite::new(Span::on_line("foo.js", 2, 5, 10)),
            CallSite::new(Span::new(
                Location::new("foo.js", 3, 0),
                Location::new("foo.js", 5, 1),
            )),
        ],
    );
    assert_eq!(dbg.call_sites_of(&SourceId::new("foo.js")).len(), 2);
    assert_eq!(dbg.markers().live_count(), 0);

    dbg.set_show_call_sites(true);
    assert_eq!(dbg.markers().live_count(), 2);

    dbg.toggle_breakpoint(1, 7);
    let styles: Vec<MarkerStyle> = dbg
        .editor()
        .expect("editor")
        .markers()
        .into_iter()
        .map(|(_, style)| style)
        .collect();
    assert_eq!(styles, [MarkerStyle::CallSite, MarkerStyle::CallSiteBreakpoint]);

    dbg.set_show_call_sites(false);
    assert_eq!(dbg.markers().live_count(), 1);
}

// ============================================================================
// Conditional panel
// ============================================================================

#[test]
fn panel_autocomplete_round_trip() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    let loc = Location::new("foo.js", 2, 0);
    assert!(dbg.open_conditional_panel(loc, false));

    let t0 = Instant::now();
    dbg.panel_input("fo", 2, t0);
    dbg.panel_input("foo", 3, t0 + Duration::from_millis(30));
    assert!(!dbg.tick(t0 + Duration::from_millis(250)));
    assert!(dbg.tick(t0 + Duration::from_millis(280)));

    let request = dbg.autocomplete_client().requests()[0].clone();
    assert_eq!(request.text, "foo");
    assert_eq!(dbg.autocomplete_results(request.generation, vec!["foobar".into()]), Ok(()));
    assert_eq!(dbg.panel().matches(), ["foobar".to_owned()]);

    assert_eq!(dbg.panel_key(PanelKey::Escape), KeyOutcome::Cancelled);
    assert!(dbg.panel().matches().is_empty());
    assert!(dbg.breakpoints().is_empty());
}

#[test]
fn panel_survives_editor_reinitialisation() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    let loc = Location::new("foo.js", 2, 0);
    dbg.open_conditional_panel(loc.clone(), true);
    dbg.panel_input("value", 5, Instant::now());

    let old = dbg.attach_editor(RecordingEditor::new(2)).expect("old editor");
    assert_eq!(old.live_widgets(), 0);
    assert!(dbg.panel().is_open());
    assert_eq!(dbg.panel().location(), Some(&loc));
    assert_eq!(dbg.panel().input(), Some("value"));
    assert_eq!(dbg.editor().map(RecordingEditor::live_widgets), Some(1));

    let commit = dbg.panel_blur().expect("blur commits");
    assert_eq!(commit.value, "value");
    assert_eq!(
        dbg.breakpoints()
            .get(&loc)
            .and_then(|bp| bp.options.log_value.as_deref()),
        Some("value")
    );
}

#[test]
fn detached_panel_waits_for_an_editor() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    dbg.open_conditional_panel(Location::new("foo.js", 2, 0), false);

    let editor = dbg.detach_editor().expect("editor");
    assert_eq!(editor.live_widgets(), 0);
    assert!(dbg.panel().is_suspended());
    dbg.render();
    assert!(dbg.panel().is_suspended());

    dbg.attach_editor(RecordingEditor::new(3));
    assert!(dbg.panel().is_open());
}

#[test]
fn suspended_panel_for_inactive_source_is_dropped() {
    let mut dbg = debugger(DebuggerConfig::default());
    select(&mut dbg, "foo.js");
    dbg.open_conditional_panel(Location::new("foo.js", 2, 0), false);
    dbg.detach_editor();
    select(&mut dbg, "bar.js");

    dbg.attach_editor(RecordingEditor::new(4));
    assert!(dbg.panel().is_closed());
    assert_eq!(dbg.editor().map(RecordingEditor::live_widgets), Some(0));
}

#[test]
fn panel_without_editor_is_noop() {
    let mut dbg = Debugger::new(
        DebuggerConfig::default(),
        RecordingBreakpointClient::default(),
        RecordingAutocompleteClient::default(),
    );
    assert!(!dbg.open_conditional_panel(Location::new("foo.js", 1, 0), false));
    assert!(dbg.panel().is_closed());
    assert_eq!(
        dbg.click(1.0, 1.0),
        Some(ToggleOutcome::Ignored(Rejection::MissingEditorBinding))
    );
}

#[test]
fn configured_debounce_is_used() {
    let config = DebuggerConfig::default().with_autocomplete_debounce(Duration::from_millis(50));
    let mut dbg = debugger(config);
    select(&mut dbg, "foo.js");
    dbg.open_conditional_panel(Location::new("foo.js", 2, 0), false);
    let t0 = Instant::now();
    dbg.panel_input("a", 1, t0);
    assert!(dbg.tick(t0 + Duration::from_millis(50)));
}
