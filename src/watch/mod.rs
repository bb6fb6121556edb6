//! Source tree watcher and rebuild coordinator.
//!
//! A notify watcher feeds filesystem events into a dedicated thread. On a
//! relevant change the coordinator pauses the dev server, runs the debounced
//! build, and resumes serving. Editor noise (temp files, metadata-only
//! events) never reaches the trigger.

mod trigger;

pub use trigger::DebouncedTrigger;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use notify::{
    event::{Event, EventKind, ModifyKind},
    RecursiveMode, Watcher as _,
};
use std::{
    path::{Path, PathBuf},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::build::BuildPipeline;
use crate::core;
use crate::serve::ServerHandle;
use crate::{debug, log};

/// How long the event loop blocks before checking for stop/shutdown.
const EVENT_POLL_MS: u64 = 200;

/// Shutdown grace window: polls of 50ms before giving up on the thread.
const GRACE_POLLS: u32 = 40;

/// Owning handle to the watcher thread.
pub struct FileWatcher {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl FileWatcher {
    /// Watch `templates_dir` recursively and coordinate rebuilds.
    ///
    /// Failure to establish the watch is fatal at startup.
    pub fn spawn(
        templates_dir: PathBuf,
        pipeline: BuildPipeline,
        server: ServerHandle,
        trigger: DebouncedTrigger,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .context("failed to create filesystem watcher")?;
        watcher
            .watch(&templates_dir, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", templates_dir.display()))?;

        let (stop_tx, stop_rx) = channel::bounded(1);
        let thread = thread::spawn(move || {
            // Keeps the watch alive for the lifetime of the loop.
            let _watcher = watcher;
            run_event_loop(&event_rx, &stop_rx, &pipeline, &server, trigger);
        });

        Ok(Self { stop_tx, thread })
    }

    /// Request the watcher thread to stop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Wait for the watcher thread to finish, bounded by a grace window.
    pub fn join_with_grace(self) {
        for _ in 0..GRACE_POLLS {
            if self.thread.is_finished() {
                let _ = self.thread.join();
                return;
            }
            thread::sleep(Duration::from_millis(50));
        }
    }
}

fn run_event_loop(
    event_rx: &mpsc::Receiver<notify::Result<Event>>,
    stop_rx: &Receiver<()>,
    pipeline: &BuildPipeline,
    server: &ServerHandle,
    mut trigger: DebouncedTrigger,
) {
    loop {
        if core::is_shutdown() || stop_rx.try_recv().is_ok() {
            return;
        }

        let event = match event_rx.recv_timeout(Duration::from_millis(EVENT_POLL_MS)) {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                log!("watch"; "watch error: {e}");
                continue;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return,
        };

        if !is_relevant(&event) {
            continue;
        }
        debug!("watch"; "change detected: {:?}", event.paths);

        // A save often arrives as a burst of events; drain the rest before
        // rebuilding so the burst maps to one trigger.
        while event_rx.try_recv().is_ok() {}

        server.pause();
        trigger.fire(&mut || pipeline.build());
        server.resume();
    }
}

/// Whether an event should trigger a rebuild.
///
/// Content-affecting kinds only, and not for editor temp files.
fn is_relevant(event: &Event) -> bool {
    let content_change = match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };

    content_change && event.paths.iter().any(|p| !is_temp_file(p))
}

/// Editor temp and backup files that should never trigger a rebuild.
fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') || name.ends_with('~') {
        return true;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
    )
}
