//! command_runner.rs - Runs package-database queries with a caller-enforced timeout.
//!
//! Each query is spawned in its own process group and registered as a
//! [`TrackedQuery`] while it runs. Output pipes are drained on helper threads so a
//! chatty child cannot block on a full pipe while we poll for its exit. When
//! the deadline passes the whole group is killed and the call reports
//! [`CommandError::TimedOut`].

use crate::error::CommandError;
use crate::process_guard::{QueryProcessGroup, TrackedQuery};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run `program args...`, returning its stdout on a zero exit status.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, CommandError> {
    debug!(program, ?args, ?timeout, "running query");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .isolate_query()
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;
    let pid = child.id();
    let query = TrackedQuery::register(pid);

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                warn!(program, pid, ?timeout, "query timed out, killing process group");
                query.kill();
                let _ = child.wait();
                break Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(source) => {
                query.kill();
                let _ = child.wait();
                break Err(CommandError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
        }
    };

    drop(query);

    let status = status?;
    let stdout = collect(stdout);
    let stderr = collect(stderr);

    if status.success() {
        Ok(stdout)
    } else {
        Err(CommandError::Failed {
            program: program.to_string(),
            code: status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
