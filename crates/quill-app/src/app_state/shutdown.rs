//! Graceful shutdown: kill PTYs, stop the backend server, persist state.

use std::time::Duration;

use super::core::QuillApp;

impl QuillApp {
    /// Perform graceful shutdown of all subsystems. Idempotent.
    ///
    /// Order matters:
    /// 1. Destroy PTYs (stop shell processes first)
    /// 2. Stop the backend server process
    /// 3. Shut down the tokio runtime
    /// 4. Persist the UI state
    pub fn shutdown(&mut self) {
        if self.shutdown_done {
            return;
        }
        tracing::info!("Initiating graceful shutdown");

        // 1. Destroy all PTY sessions
        self.ptys.destroy_all();

        // 2. Stop the backend server, then 3. the runtime it lives on
        let server = self.server.take();
        if let Some(rt) = self.tokio_runtime.take() {
            if let Some(mut server) = server {
                rt.block_on(server.shutdown());
            }
            rt.shutdown_timeout(Duration::from_secs(2));
        }

        // 4. Persist UI state
        self.sync_store();
        if let Some(path) = self.store_path.clone() {
            if let Err(e) = quill_config::store::save_store_to_path(&self.store, &path) {
                tracing::warn!("Failed to persist store: {e}");
            }
        }

        self.shutdown_done = true;
        tracing::info!("Graceful shutdown complete");
    }
}
