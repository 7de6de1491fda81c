mod app_state;
mod cli;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

fn main() -> quill_common::Result<()> {
    let args = cli::parse();

    // Initialize logging
    let log_directive = args.log_level.as_deref().unwrap_or("quill=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "quill=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("Quill v{} starting...", env!("CARGO_PKG_VERSION"));

    // Set working directory if specified
    if let Some(ref dir) = args.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            tracing::warn!("Failed to change directory to {dir}: {e}");
        }
    }

    // Load persisted UI state
    let store = quill_config::load_store().unwrap_or_else(|| {
        tracing::info!("No persisted state found, starting fresh");
        quill_config::StoreState::default()
    });

    let mut app = app_state::QuillApp::new(store);
    app.set_default_shell(args.shell.clone());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    // Ctrl-C ends the poll loop cooperatively
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    // Launch the backend server when an agent CLI is configured
    if let Some(ref server_cmd) = args.server_cmd {
        let config = quill_server::ServerConfig::new(server_cmd);
        match rt.block_on(quill_server::launch_server(&config)) {
            Ok(server) => {
                tracing::info!(url = %server.url, "Backend server ready");
                app.attach_server(server);
            }
            Err(e) => {
                tracing::error!("Backend server failed to start: {e}");
            }
        }
    }
    app.attach_runtime(rt);

    app.restore_tabs();

    tracing::info!("Entering main loop");
    while !interrupted.load(Ordering::SeqCst) && !app.should_exit() {
        app.tick();
        std::thread::sleep(Duration::from_millis(16));
    }

    app.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
