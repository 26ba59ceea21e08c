//! Process-group bookkeeping for package-database queries
//!
//! Every `pacman`/`pactree` child leads its own process group and stays
//! registered while it runs. A query past its deadline is SIGKILLed as a
//! whole group. An interrupted lftracker kills every registered group before
//! exiting, and the kernel SIGKILLs any query whose parent dies first.
//!
//! Queries are read-only, so there is no graceful SIGTERM phase.

use nix::sys::prctl;
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::os::unix::process::CommandExt;
use std::process::Command;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, info};

fn running() -> MutexGuard<'static, HashSet<u32>> {
    static RUNNING: OnceLock<Mutex<HashSet<u32>>> = OnceLock::new();
    RUNNING
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// A running query, registered until dropped.
#[derive(Debug)]
pub struct TrackedQuery {
    pgid: u32,
}

impl TrackedQuery {
    /// Register the group led by `pgid`.
    pub fn register(pgid: u32) -> Self {
        running().insert(pgid);
        debug!(pgid, "query registered");
        Self { pgid }
    }

    /// SIGKILL the query and everything it spawned.
    pub fn kill(&self) {
        kill_group(self.pgid);
    }
}

impl Drop for TrackedQuery {
    fn drop(&mut self) {
        running().remove(&self.pgid);
    }
}

/// SIGKILL the process group led by `pgid`, falling back to the leader alone.
///
/// 0 and 1 would address our own group and init; they are ignored.
pub fn kill_group(pgid: u32) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    if raw <= 1 {
        return;
    }
    if killpg(Pid::from_raw(raw), Signal::SIGKILL).is_err() {
        let _ = kill(Pid::from_raw(raw), Signal::SIGKILL);
    }
}

/// Kill every registered query group; returns how many there were.
pub fn kill_running_queries() -> usize {
    let groups: Vec<u32> = running().iter().copied().collect();
    for &pgid in &groups {
        kill_group(pgid);
    }
    groups.len()
}

/// On SIGINT, SIGTERM or SIGHUP: kill running queries, exit with 128 + signo.
pub fn install_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    std::thread::Builder::new()
        .name("lftracker-signals".to_string())
        .spawn(move || {
            if let Some(signo) = signals.forever().next() {
                let killed = kill_running_queries();
                info!(signal = signo, killed, "interrupted");
                std::process::exit(128 + signo);
            }
        })?;
    Ok(())
}

/// Spawn setup for query children.
pub trait QueryProcessGroup {
    /// Lead a new process group and die with lftracker.
    fn isolate_query(&mut self) -> &mut Self;
}

impl QueryProcessGroup for Command {
    fn isolate_query(&mut self) -> &mut Self {
        self.process_group(0);
        // SAFETY: prctl(PR_SET_PDEATHSIG) is a single async-signal-safe syscall.
        unsafe {
            self.pre_exec(|| {
                prctl::set_pdeathsig(Signal::SIGKILL).map_err(std::io::Error::from)
            });
        }
        self
    }
}
