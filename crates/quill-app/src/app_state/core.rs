//! QuillApp struct definition and constructor.

use std::path::PathBuf;

use tokio::sync::broadcast;

use quill_config::StoreState;
use quill_server::ServerInstance;
use quill_terminal::{CellMetrics, PtyEvent, PtyRegistry};

use super::ipc;
use super::types::TerminalTab;

/// Top-level application state.
pub struct QuillApp {
    pub(super) store: StoreState,
    pub(super) store_path: Option<PathBuf>,

    // PTY sessions and their event feed
    pub(super) ptys: PtyRegistry,
    pub(super) events_rx: broadcast::Receiver<PtyEvent>,

    // Terminal tabs
    pub(super) tabs: Vec<TerminalTab>,
    pub(super) active_tab: Option<quill_common::TabId>,
    pub(super) next_tab_number: u32,
    pub(super) metrics: CellMetrics,
    pub(super) default_shell: Option<String>,

    // Backend server
    pub(super) server: Option<ServerInstance>,
    pub(super) tokio_runtime: Option<tokio::runtime::Runtime>,

    pub(super) exit_requested: bool,
    pub(super) shutdown_done: bool,
}

impl QuillApp {
    pub fn new(store: StoreState) -> Self {
        let ptys = PtyRegistry::new();
        let events_rx = ptys.subscribe();
        Self {
            store,
            store_path: quill_config::store::default_store_path(),
            ptys,
            events_rx,
            tabs: Vec::new(),
            active_tab: None,
            next_tab_number: 1,
            metrics: CellMetrics::default(),
            default_shell: None,
            server: None,
            tokio_runtime: None,
            exit_requested: false,
            shutdown_done: false,
        }
    }

    /// Shell to run in new tabs, overriding the login-shell default.
    pub fn set_default_shell(&mut self, shell: Option<String>) {
        self.default_shell = shell;
    }

    pub fn attach_server(&mut self, server: ServerInstance) {
        self.server = Some(server);
    }

    pub fn attach_runtime(&mut self, runtime: tokio::runtime::Runtime) {
        self.tokio_runtime = Some(runtime);
    }

    /// One iteration of the cooperative poll loop: pump PTY I/O, route
    /// events into tab emulators, apply debounced resizes.
    pub fn tick(&mut self) {
        self.ptys.pump();
        self.route_pty_events();
        self.flush_pending_resizes();
    }

    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Entry point for a connected UI surface: route one wire request to
    /// the registry.
    pub fn handle_request(
        &mut self,
        request: ipc::TerminalRequest,
    ) -> Option<ipc::TerminalResponse> {
        ipc::dispatch(&mut self.ptys, request)
    }

    /// Mirror the tab list into the persisted store before saving.
    pub(super) fn sync_store(&mut self) {
        self.store.terminal_tabs = self.tabs.iter().map(|t| t.display_name.clone()).collect();
        self.store.active_tab = self
            .tabs
            .iter()
            .position(|t| Some(t.tab_id) == self.active_tab);
    }
}
