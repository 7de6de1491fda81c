//! Terminal tab management: open, close, activate, restore.

use quill_common::TabId;

use super::core::QuillApp;
use super::types::TerminalTab;

impl QuillApp {
    /// Open a new tab named "Terminal N" and make it active. The PTY is
    /// provisioned lazily once the tab's container reports a size.
    pub fn open_tab(&mut self) -> TabId {
        let number = self.next_tab_number;
        self.next_tab_number += 1;

        let tab_id = TabId(number);
        self.tabs
            .push(TerminalTab::new(tab_id, format!("Terminal {number}")));
        self.active_tab = Some(tab_id);
        tracing::info!(tab = number, "Terminal tab opened");
        tab_id
    }

    /// Close a tab: destroy its live PTY, release the emulator, and shift
    /// focus to the most recently added remaining tab. No-op on unknown ids.
    pub fn close_tab(&mut self, tab_id: TabId) {
        let Some(index) = self.tabs.iter().position(|t| t.tab_id == tab_id) else {
            return;
        };
        let mut tab = self.tabs.remove(index);

        if let Some(pty_id) = tab.pty_id.take() {
            self.ptys.destroy(pty_id);
        }
        // The emulator is dropped here, exactly once; the tab itself is
        // already out of the list so nothing can touch it again.
        tab.emulator.take();

        if self.active_tab == Some(tab_id) {
            self.active_tab = self.tabs.last().map(|t| t.tab_id);
        }
        tracing::info!(tab = tab_id.0, "Terminal tab closed");
    }

    /// Focus a tab. A ready tab refits to its container; it is never
    /// re-created.
    pub fn activate_tab(&mut self, tab_id: TabId, container: Option<(f32, f32)>) {
        if self.tabs.iter().all(|t| t.tab_id != tab_id) {
            return;
        }
        self.active_tab = Some(tab_id);
        if let Some((width, height)) = container {
            self.request_resize(tab_id, width, height);
        }
    }

    /// Recreate the tab set persisted in the store, or a single fresh tab.
    pub fn restore_tabs(&mut self) {
        let count = self.store.terminal_tabs.len().max(1);
        for _ in 0..count {
            self.open_tab();
        }
        if let Some(index) = self.store.active_tab {
            if let Some(tab) = self.tabs.get(index) {
                self.active_tab = Some(tab.tab_id);
            }
        }
        tracing::info!(count, "Terminal tabs restored");
    }

    pub(super) fn find_tab_mut(&mut self, tab_id: TabId) -> Option<&mut TerminalTab> {
        self.tabs.iter_mut().find(|t| t.tab_id == tab_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_config::StoreState;

    fn test_app() -> QuillApp {
        let mut app = QuillApp::new(StoreState::default());
        app.store_path = None;
        app
    }

    #[test]
    fn tabs_are_numbered_sequentially() {
        let mut app = test_app();
        let a = app.open_tab();
        let b = app.open_tab();
        let c = app.open_tab();

        let names: Vec<&str> = app.tabs.iter().map(|t| t.display_name.as_str()).collect();
        assert_eq!(names, ["Terminal 1", "Terminal 2", "Terminal 3"]);
        assert_eq!((a.0, b.0, c.0), (1, 2, 3));
        assert_eq!(app.active_tab, Some(c));
    }

    #[test]
    fn numbers_are_not_reused_after_close() {
        let mut app = test_app();
        let a = app.open_tab();
        app.close_tab(a);
        let b = app.open_tab();
        assert_eq!(b.0, 2);
        assert_eq!(app.tabs[0].display_name, "Terminal 2");
    }

    #[test]
    fn close_focuses_most_recently_added_remaining_tab() {
        let mut app = test_app();
        let a = app.open_tab();
        let b = app.open_tab();
        let c = app.open_tab();

        app.activate_tab(b, None);
        app.close_tab(b);
        assert_eq!(app.active_tab, Some(c));

        app.close_tab(c);
        assert_eq!(app.active_tab, Some(a));

        app.close_tab(a);
        assert_eq!(app.active_tab, None);
    }

    #[test]
    fn closing_inactive_tab_keeps_focus() {
        let mut app = test_app();
        let a = app.open_tab();
        let b = app.open_tab();

        app.activate_tab(b, None);
        app.close_tab(a);
        assert_eq!(app.active_tab, Some(b));
    }

    #[test]
    fn close_unknown_tab_is_a_noop() {
        let mut app = test_app();
        app.close_tab(TabId(42));
        assert!(app.tabs.is_empty());
    }

    #[test]
    fn activate_unknown_tab_is_a_noop() {
        let mut app = test_app();
        let a = app.open_tab();
        app.activate_tab(TabId(42), None);
        assert_eq!(app.active_tab, Some(a));
    }

    #[test]
    fn restore_recreates_persisted_tabs() {
        let mut app = test_app();
        app.store.terminal_tabs = vec!["Terminal 1".into(), "Terminal 2".into()];
        app.store.active_tab = Some(0);

        app.restore_tabs();
        assert_eq!(app.tabs.len(), 2);
        assert_eq!(app.active_tab, Some(app.tabs[0].tab_id));
    }

    #[test]
    fn restore_with_empty_store_opens_one_tab() {
        let mut app = test_app();
        app.restore_tabs();
        assert_eq!(app.tabs.len(), 1);
        assert_eq!(app.tabs[0].display_name, "Terminal 1");
    }

    #[cfg(unix)]
    #[test]
    fn close_destroys_the_live_pty() {
        let mut app = test_app();
        app.set_default_shell(Some("/bin/sh".into()));
        let a = app.open_tab();
        let b = app.open_tab();
        app.drive_init(a, Some((800.0, 480.0)));
        app.drive_init(b, Some((800.0, 480.0)));
        assert_eq!(app.ptys.len(), 2);

        app.close_tab(b);
        assert_eq!(app.ptys.len(), 1);
        assert_eq!(app.tabs.len(), 1);

        // Closing again is a no-op.
        app.close_tab(b);
        assert_eq!(app.ptys.len(), 1);

        app.close_tab(a);
        assert!(app.ptys.is_empty());
    }
}
