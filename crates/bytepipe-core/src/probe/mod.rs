//! Ephemeral port collision probing.
//!
//! The probe repeatedly asks the kernel for an ephemeral TCP port (bind to
//! port 0), then checks whether any *other* process already holds a socket
//! on that port. A hit means the kernel handed out a port that is still in
//! use elsewhere, e.g. by a connection whose local or remote side happens to
//! share the number.
//!
//! The two OS-facing operations live behind [`PortInspector`] so the loop in
//! [`run_probe`] can be exercised without touching real sockets.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::ProbeConfig;
use crate::error::{Error, Result};

#[cfg(target_os = "linux")]
mod procfs;

/// A port handed out by [`PortInspector::probe_available_port`].
///
/// Holds the bound socket (if any) so the port stays reserved until the
/// value is dropped.
#[derive(Debug)]
pub struct ProbedPort {
    port: u16,
    _socket: Option<Socket>,
}

impl ProbedPort {
    /// Wrap a bound socket and the port it was assigned.
    #[must_use]
    pub fn bound(port: u16, socket: Socket) -> Self {
        Self {
            port,
            _socket: Some(socket),
        }
    }

    /// A port that is not backed by a socket held by this process.
    #[must_use]
    pub const fn unbound(port: u16) -> Self {
        Self {
            port,
            _socket: None,
        }
    }

    /// The probed port number.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// OS operations the probe loop depends on.
pub trait PortInspector {
    /// Bind an ephemeral port and keep it reserved while the result lives.
    fn probe_available_port(&self) -> Result<ProbedPort>;

    /// Ids of all processes holding a TCP or UDP socket on `port`.
    fn list_owning_processes(&self, port: u16) -> Result<BTreeSet<u32>>;
}

/// [`PortInspector`] backed by real sockets and the process table.
#[derive(Debug, Clone)]
pub struct SystemInspector {
    bind_address: IpAddr,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    proc_root: PathBuf,
}

impl SystemInspector {
    /// Create an inspector that binds probe sockets to `bind_address`.
    #[must_use]
    pub fn new(bind_address: IpAddr) -> Self {
        Self {
            bind_address,
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Read process and socket tables from `root` instead of `/proc`.
    #[must_use]
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }
}

impl PortInspector for SystemInspector {
    fn probe_available_port(&self) -> Result<ProbedPort> {
        let addr = SocketAddr::new(self.bind_address, 0);
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| Error::Probe(format!("cannot create socket: {e}")))?;
        socket
            .bind(&addr.into())
            .map_err(|e| Error::Probe(format!("cannot bind {addr}: {e}")))?;

        let port = socket
            .local_addr()?
            .as_socket()
            .map(|a| a.port())
            .ok_or_else(|| Error::Probe("bound socket has no inet address".to_string()))?;

        Ok(ProbedPort::bound(port, socket))
    }

    #[cfg(target_os = "linux")]
    fn list_owning_processes(&self, port: u16) -> Result<BTreeSet<u32>> {
        let inodes = procfs::socket_inodes(&self.proc_root, port)?;
        if inodes.is_empty() {
            return Ok(BTreeSet::new());
        }
        Ok(procfs::owning_pids(&self.proc_root, &inodes))
    }

    #[cfg(not(target_os = "linux"))]
    fn list_owning_processes(&self, _port: u16) -> Result<BTreeSet<u32>> {
        Err(Error::Unsupported("listing socket owners"))
    }
}

/// Loop parameters for [`run_probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Number of bind-and-inspect rounds
    pub iterations: u32,
    /// Emit [`ProbeEvent::Iteration`] every this many rounds
    pub report_every: u32,
}

impl From<&ProbeConfig> for ProbeOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            iterations: config.iterations,
            report_every: config.report_every,
        }
    }
}

/// Progress reported while probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// Starting round `current` of `total`
    Iteration {
        /// One-based round number
        current: u32,
        /// Total rounds
        total: u32,
    },
    /// Another process holds the probed port
    Conflict {
        /// The probed port
        port: u16,
        /// Owning processes, excluding this one
        pids: BTreeSet<u32>,
    },
}

/// Outcome of a probe run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Rounds performed
    pub iterations: u32,
    /// Number of rounds that found the probed port in use
    pub total_collisions: u64,
    /// Ports found in use, with the number of rounds each was hit
    pub collisions: BTreeMap<u16, u32>,
}

impl ProbeReport {
    /// Whether any round found a collision.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Run the probe loop.
///
/// A failing bind aborts the run; a failing owner lookup is logged and the
/// round counts as collision-free, unless the platform cannot list owners at
/// all.
pub fn run_probe<I, F>(
    inspector: &I,
    options: &ProbeOptions,
    mut observer: F,
) -> Result<ProbeReport>
where
    I: PortInspector + ?Sized,
    F: FnMut(&ProbeEvent),
{
    let own_pid = std::process::id();
    let report_every = options.report_every.max(1);
    let mut report = ProbeReport {
        iterations: options.iterations,
        ..ProbeReport::default()
    };

    for current in 1..=options.iterations {
        if (current - 1) % report_every == 0 {
            observer(&ProbeEvent::Iteration {
                current,
                total: options.iterations,
            });
        }

        let probed = inspector.probe_available_port()?;
        let port = probed.port();

        match inspector.list_owning_processes(port) {
            Ok(mut pids) => {
                pids.remove(&own_pid);
                if !pids.is_empty() {
                    *report.collisions.entry(port).or_insert(0) += 1;
                    report.total_collisions += 1;
                    observer(&ProbeEvent::Conflict { port, pids });
                }
            }
            Err(e @ Error::Unsupported(_)) => return Err(e),
            Err(e) => tracing::warn!("Failed to inspect port {}: {}", port, e),
        }

        drop(probed);
    }

    Ok(report)
}
