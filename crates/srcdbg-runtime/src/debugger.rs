#![forbid(unsafe_code)]

//! The source debugger orchestrator.
//!
//! [`SourceDebugger`] owns every piece of state (sources, tabs, breakpoints,
//! call sites, marker instances, the condition panel) plus the bound editor
//! and the two service clients, and runs the data flow end to end:
//!
//! ```text
//!  tab actions ──▶ TabStore ──▶ active source
//!                                   │
//!  call sites + BreakpointStore ──▶ resolve ──▶ MarkerReconciler ──▶ editor
//!                                   │
//!  panel events ──▶ ConditionPanel ──▶ commit ──▶ BreakpointStore ──▶ client
//! ```
//!
//! Every mutation ends with [`render`](SourceDebugger::render), which
//! re-resolves the active source, reconciles markers, and rebuilds a
//! suspended panel. Service completions arrive through the
//! `breakpoint_*` and [`autocomplete_results`](SourceDebugger::autocomplete_results)
//! methods; time advances through [`tick`](SourceDebugger::tick).

use ahash::AHashMap;
use srcdbg_core::{
    BreakpointOptions, BreakpointStore, CallSite, CompleteAddOutcome, DebuggerConfig, Location,
    Rejection, SetOptionsOutcome, Source, SourceId, SourceRegistry, TabStore, TogglePlan,
    plan_toggle, resolve, to_editor_line, to_source_line,
};
use web_time::Instant;

use crate::client::{AutocompleteClient, BreakpointClient};
use crate::editor::{Editor, LineTextFn};
use crate::markers::MarkerReconciler;
use crate::panel::{ConditionPanel, KeyOutcome, PanelCommit, PanelKey};

/// Result of a breakpoint toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// An add was requested at this location.
    Added(Location),
    /// Removal was requested for the breakpoint recorded here.
    Removed(Location),
    /// Nothing happened.
    Ignored(Rejection),
}

/// Debugger UI state wired to an editor and two services.
#[derive(Debug)]
pub struct SourceDebugger<E, B, A>
where
    E: Editor,
    B: BreakpointClient,
    A: AutocompleteClient,
{
    config: DebuggerConfig,
    sources: SourceRegistry,
    tabs: TabStore,
    breakpoints: BreakpointStore,
    call_sites: AHashMap<SourceId, Vec<CallSite>>,
    markers: MarkerReconciler,
    panel: ConditionPanel,
    show_call_sites: bool,
    editor: Option<E>,
    breakpoint_client: B,
    autocomplete_client: A,
}

impl<E, B, A> SourceDebugger<E, B, A>
where
    E: Editor,
    B: BreakpointClient,
    A: AutocompleteClient,
{
    pub fn new(config: DebuggerConfig, breakpoint_client: B, autocomplete_client: A) -> Self {
        let config = config.validated();
        Self {
            sources: SourceRegistry::new(),
            tabs: TabStore::new(),
            breakpoints: BreakpointStore::new(),
            call_sites: AHashMap::new(),
            markers: MarkerReconciler::new(),
            panel: ConditionPanel::new(config.autocomplete_debounce()),
            show_call_sites: config.show_call_sites,
            editor: None,
            breakpoint_client,
            autocomplete_client,
            config,
        }
    }

    // --- sources and tabs ---------------------------------------------

    /// Register a source so tabs can be opened for it.
    pub fn new_source(&mut self, id: impl Into<SourceId>, url: impl Into<String>) {
        let source = Source::new(id, url);
        tracing::debug!(
            target: "srcdbg.tabs",
            source = %source.id,
            url = %source.url,
            "new source"
        );
        self.sources.insert(source);
    }

    /// Open a tab without selecting it.
    pub fn open_tab(&mut self, id: impl Into<SourceId>, url: impl Into<String>) -> bool {
        self.tabs.open(id.into(), url)
    }

    /// Open (if needed) and select the tab of a registered source.
    pub fn select_location(&mut self, id: &SourceId) -> Result<(), Rejection> {
        let Some(url) = self.sources.url_of(id) else {
            tracing::debug!(
                target: "srcdbg.tabs",
                source = %id,
                reason = Rejection::InvalidSelection.as_str(),
                "select of unknown source ignored"
            );
            return Err(Rejection::InvalidSelection);
        };
        self.tabs.open(id.clone(), url);
        self.tabs.select(id);
        self.log_active("select");
        self.render();
        Ok(())
    }

    /// Select an already open tab.
    pub fn select_tab(&mut self, id: &SourceId) -> Result<(), Rejection> {
        if !self.tabs.select(id) {
            tracing::debug!(
                target: "srcdbg.tabs",
                source = %id,
                reason = Rejection::InvalidSelection.as_str(),
                "select of closed tab ignored"
            );
            return Err(Rejection::InvalidSelection);
        }
        self.log_active("select");
        self.render();
        Ok(())
    }

    pub fn close_tab(&mut self, url: &str) -> bool {
        let closed = self.tabs.close_one(url);
        if closed {
            self.log_active("close");
            self.render();
        }
        closed
    }

    /// Close every tab whose URL is in `urls` in one step.
    pub fn close_tabs<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let closed = self.tabs.close_many(urls);
        if closed > 0 {
            self.log_active("close");
            self.render();
        }
        closed
    }

    pub fn move_tab(&mut self, url: &str, to_index: usize) -> bool {
        self.tabs.move_tab(url, to_index)
    }

    // --- call sites -----------------------------------------------------

    /// Replace the call sites known for a source. Multi-line ones are
    /// dropped.
    pub fn set_call_sites(&mut self, source_id: impl Into<SourceId>, call_sites: Vec<CallSite>) {
        let source_id = source_id.into();
        let call_sites: Vec<CallSite> = call_sites
            .into_iter()
            .filter(CallSite::is_single_line)
            .collect();
        tracing::debug!(
            target: "srcdbg.markers",
            source = %source_id,
            count = call_sites.len(),
            "call sites updated"
        );
        let is_active = self.tabs.active() == Some(&source_id);
        self.call_sites.insert(source_id, call_sites);
        if is_active {
            self.render();
        }
    }

    pub fn set_show_call_sites(&mut self, show: bool) {
        if self.show_call_sites != show {
            self.show_call_sites = show;
            self.render();
        }
    }

    // --- editor binding -------------------------------------------------

    /// Bind an editor, replacing (reinitialising) any previous one.
    ///
    /// An open panel is suspended against the old editor and rebuilt on
    /// the new one; markers are recreated in the new editor.
    pub fn attach_editor(&mut self, editor: E) -> Option<E> {
        let mut previous = self.editor.take();
        self.panel.detach(previous.as_mut());
        tracing::debug!(
            target: "srcdbg.markers",
            editor = editor.id().0,
            replaced = previous.is_some(),
            "editor attached"
        );
        self.editor = Some(editor);
        self.render();
        previous
    }

    /// Unbind the editor, clearing everything drawn in it.
    pub fn detach_editor(&mut self) -> Option<E> {
        let mut editor = self.editor.take()?;
        self.panel.detach(Some(&mut editor));
        self.markers.clear_all(Some(&mut editor));
        tracing::debug!(target: "srcdbg.markers", editor = editor.id().0, "editor detached");
        Some(editor)
    }

    // --- breakpoints ----------------------------------------------------

    /// Toggle the breakpoint at a 0-based editor line and column.
    pub fn toggle_breakpoint(&mut self, editor_line: u32, column: u32) -> ToggleOutcome {
        let plan = match self.tabs.active() {
            Some(active) => plan_toggle(
                Some(active),
                self.call_sites_of(active),
                &self.breakpoints,
                editor_line,
                column,
            ),
            None => plan_toggle(None, &[], &self.breakpoints, editor_line, column),
        };

        let outcome = match plan {
            TogglePlan::Add(location) => {
                let options = BreakpointOptions::default();
                self.request_add(location.clone(), options);
                ToggleOutcome::Added(location)
            }
            TogglePlan::Remove(location) => {
                if self.breakpoints.begin_remove(&location) {
                    self.breakpoint_client.remove_breakpoint(&location);
                    ToggleOutcome::Removed(location)
                } else {
                    ToggleOutcome::Ignored(Rejection::ReentrantToggle)
                }
            }
            TogglePlan::Ignored(reason) => ToggleOutcome::Ignored(reason),
        };

        match &outcome {
            ToggleOutcome::Ignored(reason) => tracing::debug!(
                target: "srcdbg.breakpoints",
                editor_line,
                column,
                reason = reason.as_str(),
                "toggle ignored"
            ),
            ToggleOutcome::Added(location) | ToggleOutcome::Removed(location) => {
                tracing::debug!(
                    target: "srcdbg.breakpoints",
                    location = %location,
                    added = matches!(outcome, ToggleOutcome::Added(_)),
                    "toggle requested"
                );
                self.render();
            }
        }
        outcome
    }

    /// Toggle the breakpoint of the call site under a raw click.
    ///
    /// Returns `None` when the click is not on a call site of the active
    /// source. A new breakpoint goes to the call site's first column.
    pub fn click(&mut self, x: f64, y: f64) -> Option<ToggleOutcome> {
        let Some(editor) = self.editor.as_ref() else {
            tracing::debug!(
                target: "srcdbg.breakpoints",
                reason = Rejection::MissingEditorBinding.as_str(),
                "click ignored"
            );
            return Some(ToggleOutcome::Ignored(Rejection::MissingEditorBinding));
        };
        let position = editor.position_from_coords(x, y)?;
        let active = self.tabs.active()?;
        let line = to_source_line(position.line);
        let start_column = self
            .call_sites_of(active)
            .iter()
            .find(|call_site| call_site.location.contains(line, position.column))?
            .location
            .start
            .column;
        Some(self.toggle_breakpoint(position.line, start_column))
    }

    /// The service placed a requested breakpoint at `actual`.
    pub fn breakpoint_added(
        &mut self,
        requested: &Location,
        actual: Location,
    ) -> CompleteAddOutcome {
        let outcome = self.breakpoints.complete_add(requested, actual);
        if outcome.changed() {
            self.render();
        }
        outcome
    }

    pub fn breakpoint_add_failed(&mut self, requested: &Location) -> bool {
        let dropped = self.breakpoints.fail_add(requested);
        if dropped {
            self.render();
        }
        dropped
    }

    pub fn breakpoint_removed(&mut self, location: &Location) -> bool {
        let removed = self.breakpoints.complete_remove(location).is_some();
        if removed {
            self.render();
        }
        removed
    }

    pub fn breakpoint_remove_failed(&mut self, location: &Location) -> bool {
        let restored = self.breakpoints.fail_remove(location);
        if restored {
            self.render();
        }
        restored
    }

    // --- conditional panel ----------------------------------------------

    /// Open the condition (or log value) editor for `location`.
    pub fn open_conditional_panel(&mut self, location: Location, log_point: bool) -> bool {
        let existing = self.breakpoints.get(&location).map(|bp| &bp.options);
        self.panel
            .open(location, log_point, existing, self.editor.as_mut())
    }

    pub fn panel_input(&mut self, text: impl Into<String>, cursor: usize, now: Instant) -> bool {
        self.panel.on_input(text, cursor, now)
    }

    /// Route a key to the panel; Enter applies the edit.
    pub fn panel_key(&mut self, key: PanelKey) -> KeyOutcome {
        let outcome = self.panel.on_key(key, self.editor.as_mut());
        if let KeyOutcome::Commit(commit) = &outcome {
            self.apply_commit(commit);
        }
        outcome
    }

    /// Focus left the panel input; the edit is applied.
    pub fn panel_blur(&mut self) -> Option<PanelCommit> {
        let commit = self.panel.on_blur(self.editor.as_mut())?;
        self.apply_commit(&commit);
        Some(commit)
    }

    pub fn panel_scroll(&mut self) -> bool {
        match self.editor.as_mut() {
            Some(editor) => self.panel.on_scroll(editor),
            None => false,
        }
    }

    /// Close the panel without applying anything.
    pub fn close_conditional_panel(&mut self) -> bool {
        self.panel.close(self.editor.as_mut())
    }

    /// Deliver autocomplete results tagged with their request generation.
    pub fn autocomplete_results(
        &mut self,
        generation: u64,
        matches: Vec<String>,
    ) -> Result<(), Rejection> {
        self.panel.receive_matches(generation, matches)
    }

    /// Advance time: fires a due autocomplete request.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.panel.poll(now, &mut self.autocomplete_client)
    }

    // --- rendering ------------------------------------------------------

    /// Bring editor-side state in line with the model.
    pub fn render(&mut self) {
        let active = self.tabs.active().cloned();
        let panel_valid = self
            .panel
            .location()
            .is_some_and(|location| active.as_ref() == Some(&location.source_id));

        if self.panel.is_open() && !panel_valid {
            self.panel.close(self.editor.as_mut());
        }

        let call_sites = active
            .as_ref()
            .and_then(|id| self.call_sites.get(id))
            .map_or(&[][..], Vec::as_slice);
        let resolved = resolve(call_sites, &self.breakpoints);
        self.markers
            .reconcile(&resolved, self.show_call_sites, self.editor.as_mut());

        if self.panel.is_suspended() {
            if let Some(editor) = self.editor.as_mut() {
                self.panel.resume(editor, panel_valid);
            }
        }
    }

    // --- queries ----------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    #[must_use]
    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    #[must_use]
    pub fn tabs(&self) -> &TabStore {
        &self.tabs
    }

    #[must_use]
    pub fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerReconciler {
        &self.markers
    }

    #[must_use]
    pub fn panel(&self) -> &ConditionPanel {
        &self.panel
    }

    #[must_use]
    pub fn show_call_sites(&self) -> bool {
        self.show_call_sites
    }

    /// Single-line call sites known for a source.
    #[must_use]
    pub fn call_sites_of(&self, source_id: &SourceId) -> &[CallSite] {
        self.call_sites.get(source_id).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn editor(&self) -> Option<&E> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut E> {
        self.editor.as_mut()
    }

    #[must_use]
    pub fn breakpoint_client(&self) -> &B {
        &self.breakpoint_client
    }

    pub fn breakpoint_client_mut(&mut self) -> &mut B {
        &mut self.breakpoint_client
    }

    #[must_use]
    pub fn autocomplete_client(&self) -> &A {
        &self.autocomplete_client
    }

    pub fn autocomplete_client_mut(&mut self) -> &mut A {
        &mut self.autocomplete_client
    }

    // --- internals --------------------------------------------------------

    fn request_add(&mut self, location: Location, options: BreakpointOptions) {
        if !self.breakpoints.begin_add(location.clone(), options.clone()) {
            return;
        }
        self.send_add(&location, &options);
    }

    fn send_add(&mut self, location: &Location, options: &BreakpointOptions) {
        let source_url = self
            .tabs
            .url_of(&location.source_id)
            .or_else(|| self.sources.url_of(&location.source_id))
            .unwrap_or_default()
            .to_owned();
        let line_text = self
            .editor
            .as_ref()
            .map_or_else(LineTextFn::empty, |editor| {
                editor.line_text(to_editor_line(location.line))
            });
        self.breakpoint_client
            .add_breakpoint(location, &source_url, options, line_text);
    }

    fn apply_commit(&mut self, commit: &PanelCommit) {
        let current = self
            .breakpoints
            .get(&commit.location)
            .map(|bp| bp.options.clone())
            .unwrap_or_default();
        let options = commit.apply_to(&current);
        match self.breakpoints.set_options(&commit.location, options.clone()) {
            SetOptionsOutcome::Updated => {
                self.breakpoint_client
                    .set_breakpoint_options(&commit.location, &options);
            }
            SetOptionsOutcome::Added => self.send_add(&commit.location, &options),
            SetOptionsOutcome::Ignored => {
                tracing::debug!(
                    target: "srcdbg.breakpoints",
                    location = %commit.location,
                    reason = Rejection::ReentrantToggle.as_str(),
                    "options update ignored"
                );
                return;
            }
        }
        self.render();
    }

    fn log_active(&self, op: &'static str) {
        tracing::debug!(
            target: "srcdbg.tabs",
            op,
            active = ?self.tabs.active().map(SourceId::as_str),
            tabs = self.tabs.len(),
            "active source"
        );
    }
}
