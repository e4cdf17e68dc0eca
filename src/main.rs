//! NeuroRAVE session process.
//!
//! Communicates with the UI host via JSON-line IPC on stdin/stdout.
//! Initializes logging and configuration, then runs the single event loop
//! that feeds host commands to the session coordinator.

use std::io;

use tokio::sync::mpsc;
use tracing::{info, warn};

use neurorave_session::config::paths::get_log_dir;
use neurorave_session::config::read_session_config;
use neurorave_session::ipc::bridge::{forward_events, spawn_stdin_reader};
use neurorave_session::ipc::SessionEvent;
use neurorave_session::logger;
use neurorave_session::runtime::SessionRuntime;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = logger::init(&get_log_dir()) {
        logger::init_stderr();
        warn!("File logging unavailable: {:#}", e);
    }

    // All stdout writes go through this one task, in order.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        forward_events(event_rx, &mut stdout).await;
    });

    let _ = event_tx.send(SessionEvent::Starting {});

    let config = read_session_config();
    info!(?config, "Configuration loaded");

    let cmd_rx = spawn_stdin_reader();
    let runtime = SessionRuntime::from_config(&config, event_tx.clone());

    let _ = event_tx.send(SessionEvent::Ready {});
    info!("Session core ready");

    runtime.run(cmd_rx).await;

    drop(event_tx);
    let _ = writer.await;
    info!("Session core stopped");
}
