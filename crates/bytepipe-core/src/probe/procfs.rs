//! Socket ownership lookup through the Linux `/proc` filesystem.
//!
//! `/proc/net/{tcp,tcp6,udp,udp6}` map socket inodes to local and remote
//! addresses; `/proc/<pid>/fd/*` links name the inodes a process holds as
//! `socket:[<inode>]`. Joining the two gives the owners of a port.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::Result;

const SOCKET_TABLES: [&str; 4] = ["net/tcp", "net/tcp6", "net/udp", "net/udp6"];

/// Inodes of sockets whose local or remote port equals `port`.
pub(super) fn socket_inodes(proc_root: &Path, port: u16) -> Result<HashSet<u64>> {
    let mut inodes = HashSet::new();

    for table in SOCKET_TABLES {
        let content = match fs::read_to_string(proc_root.join(table)) {
            Ok(content) => content,
            // tcp6/udp6 are absent when IPv6 is disabled
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        inodes.extend(
            content
                .lines()
                .skip(1)
                .filter_map(parse_socket_line)
                .filter(|entry| entry.local_port == port || entry.remote_port == port)
                .map(|entry| entry.inode),
        );
    }

    Ok(inodes)
}

/// Pids whose descriptor table references one of `inodes`.
///
/// Processes that exit mid-scan or whose `fd` directory is not readable by
/// the current user are skipped.
pub(super) fn owning_pids(proc_root: &Path, inodes: &HashSet<u64>) -> BTreeSet<u32> {
    let mut pids = BTreeSet::new();
    let Ok(entries) = fs::read_dir(proc_root) else {
        return pids;
    };

    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
            continue;
        };

        let holds_socket = fds.flatten().any(|fd| {
            fs::read_link(fd.path())
                .ok()
                .and_then(|target| target.to_str().and_then(parse_socket_link))
                .is_some_and(|inode| inodes.contains(&inode))
        });

        if holds_socket {
            pids.insert(pid);
        }
    }

    pids
}

#[derive(Debug, PartialEq, Eq)]
struct SocketEntry {
    local_port: u16,
    remote_port: u16,
    inode: u64,
}

/// Parse one row of a `/proc/net` socket table.
///
/// ```text
///   sl  local_address rem_address   st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode
///    0: 0100007F:0CEA 00000000:0000 0A 00000000:00000000 00:00000000 00000000 1000 0 23416 ...
/// ```
///
/// Inode 0 marks sockets no process owns any more (e.g. `TIME_WAIT`).
fn parse_socket_line(line: &str) -> Option<SocketEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 {
        return None;
    }

    let inode = fields[9].parse::<u64>().ok().filter(|&i| i != 0)?;

    Some(SocketEntry {
        local_port: parse_hex_port(fields[1])?,
        remote_port: parse_hex_port(fields[2])?,
        inode,
    })
}

fn parse_hex_port(addr: &str) -> Option<u16> {
    let (_, port) = addr.rsplit_once(':')?;
    u16::from_str_radix(port, 16).ok()
}

fn parse_socket_link(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
