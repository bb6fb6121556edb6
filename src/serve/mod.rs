//! Development HTTP server with a pause/resume lifecycle.
//!
//! The serving thread owns the listener for its whole lifetime and
//! alternates between serving and idling under command of the rebuild
//! coordinator:
//!
//! ```text
//! Stopped -> Serving <-> Paused -> ... -> Closed
//! ```
//!
//! `pause` stops request handling and is acknowledged, so the caller knows
//! the output directory is no longer being read before replacing it. The
//! listener stays bound while paused: connections arriving mid-rebuild
//! queue and are answered after `resume`, so a concurrent poller never sees
//! a refused connection. `close` is terminal and releases the socket.

mod path;
mod response;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::{Request, Server};

use crate::{debug, log};

/// How long the serving loop waits for a request before checking commands.
const ACCEPT_POLL_MS: u64 = 200;

/// Idle sleep while paused.
const PAUSE_POLL_MS: u64 = 200;

/// Shutdown grace window: polls of 50ms before giving up on the thread.
const GRACE_POLLS: u32 = 40;

/// Lifecycle commands delivered to the serving thread.
enum ServerCmd {
    /// Stop handling requests; ack once the in-flight one is done.
    Pause(Sender<()>),
    /// Resume request handling.
    Resume,
    /// Permanent shutdown.
    Close,
}

/// A bound dev server, not yet serving.
pub struct DevServer {
    server: Server,
    addr: SocketAddr,
    output_dir: PathBuf,
}

impl DevServer {
    /// Bind the listener. Failure here is fatal at startup.
    pub fn bind(addr: SocketAddr, output_dir: PathBuf) -> Result<Self> {
        let server =
            Server::http(addr).map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
        let addr = server
            .server_addr()
            .to_ip()
            .context("server bound to a non-IP address")?;
        Ok(Self {
            server,
            addr,
            output_dir,
        })
    }

    /// The bound address (port 0 resolves to the actual port).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the serving thread.
    pub fn spawn(self) -> RunningServer {
        let (cmd_tx, cmd_rx) = channel::unbounded();
        let addr = self.addr;
        let thread = thread::spawn(move || {
            run_server_loop(&self.server, &self.output_dir, &cmd_rx);
        });
        RunningServer {
            cmd_tx,
            thread,
            addr,
        }
    }
}

/// Owning handle to the serving thread.
pub struct RunningServer {
    cmd_tx: Sender<ServerCmd>,
    thread: JoinHandle<()>,
    addr: SocketAddr,
}

impl RunningServer {
    /// The bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cloneable command endpoint for the rebuild coordinator.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Request permanent shutdown.
    pub fn close(&self) {
        let _ = self.cmd_tx.send(ServerCmd::Close);
    }

    /// Wait for the serving thread to finish, bounded by a grace window.
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

/// Command endpoint used by the rebuild coordinator.
#[derive(Clone)]
pub struct ServerHandle {
    cmd_tx: Sender<ServerCmd>,
}

impl ServerHandle {
    /// Stop handling requests until `resume`.
    ///
    /// Blocks until the serving thread acknowledges, guaranteeing the
    /// output directory is no longer being read when this returns. The
    /// listener stays bound, so connections made during the pause window
    /// queue instead of being refused.
    pub fn pause(&self) {
        let (ack_tx, ack_rx) = channel::bounded(1);
        if self.cmd_tx.send(ServerCmd::Pause(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Resume request handling.
    pub fn resume(&self) {
        let _ = self.cmd_tx.send(ServerCmd::Resume);
    }
}

fn run_server_loop(server: &Server, output_dir: &Path, cmd_rx: &Receiver<ServerCmd>) {
    let mut serving = true;

    loop {
        if serving {
            match server.recv_timeout(Duration::from_millis(ACCEPT_POLL_MS)) {
                Ok(Some(request)) => handle_request(request, output_dir),
                Ok(None) => {}
                Err(e) => {
                    // Transient accept errors (e.g. socket closed during a
                    // shutdown race) back off and re-check commands.
                    debug!("serve"; "accept error: {e}");
                    thread::sleep(Duration::from_millis(ACCEPT_POLL_MS));
                }
            }
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    if apply_command(&mut serving, cmd) {
                        break;
                    }
                }
                Err(channel::TryRecvError::Empty) => {}
                Err(channel::TryRecvError::Disconnected) => break,
            }
        } else {
            // Paused: the listener keeps accepting, requests pile up
            // untouched until resume.
            match cmd_rx.recv_timeout(Duration::from_millis(PAUSE_POLL_MS)) {
                Ok(cmd) => {
                    if apply_command(&mut serving, cmd) {
                        break;
                    }
                }
                Err(channel::RecvTimeoutError::Timeout) => {}
                Err(channel::RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

/// Apply a lifecycle command. Returns true on `Close`.
fn apply_command(serving: &mut bool, cmd: ServerCmd) -> bool {
    match cmd {
        ServerCmd::Pause(ack) => {
            *serving = false;
            let _ = ack.send(());
            false
        }
        ServerCmd::Resume => {
            *serving = true;
            false
        }
        ServerCmd::Close => true,
    }
}

fn handle_request(request: Request, output_dir: &Path) {
    debug!("serve"; "{} {}", request.method(), request.url());

    let result = match path::resolve_path(request.url(), output_dir) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    };
    if let Err(e) = result {
        log!("serve"; "request error: {e}");
    }
}
