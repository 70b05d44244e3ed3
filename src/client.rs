//! Test client invocation.
//!
//! One `ClientRunner` serves a whole run: it resolves the client executable
//! up front, then launches it once per test script with a bounded wait.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::HarnessError;

/// How often the bounded wait polls the child for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Longest the runner lingers on the capture after the client has exited.
const PIPE_GRACE: Duration = Duration::from_secs(1);

/// How one client invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// The client exited on its own with this code.
    Exited(i32),
    /// The client was terminated by a signal before it could exit.
    Killed,
    /// The client exceeded its time limit and was killed by the harness.
    TimedOut,
}

/// Structured result of one client invocation.
///
/// The combined stdout/stderr text is captured whenever the client runs to
/// completion; whether any of it is shown is the reporter's decision, not
/// the runner's. A timed-out invocation carries no text.
#[derive(Debug)]
pub struct ClientOutput {
    pub status: ClientStatus,
    pub combined: String,
}

/// Launches the external test client, one invocation per test script.
#[derive(Debug, Clone)]
pub struct ClientRunner {
    program: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
}

impl ClientRunner {
    /// Resolves the client executable and the directory invocations run in.
    ///
    /// The client path is checked here so a misconfigured run fails before
    /// any test starts.
    pub fn new(program: &Path, work_dir: &Path, timeout: Duration) -> Result<Self, HarnessError> {
        if !program.is_file() {
            return Err(HarnessError::ClientNotFound {
                path: program.to_path_buf(),
            });
        }
        // A relative program path is ambiguous once the child switches to
        // the test directory as its cwd.
        let program = program.canonicalize()?;
        Ok(Self {
            program,
            work_dir: work_dir.to_path_buf(),
            timeout,
        })
    }

    /// Runs the client once, with the script name as its sole argument.
    ///
    /// Blocks until the client exits or the time limit runs out; on expiry
    /// the child is killed and reaped, and its output is discarded without
    /// waiting on the pipes. After a normal exit the capture is collected
    /// within a short grace, so leaked descendants never hold a run open.
    pub fn run(&self, script_name: &str) -> Result<ClientOutput, HarnessError> {
        let mut child = Command::new(&self.program)
            .arg(script_name)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::ClientSpawn {
                path: self.program.clone(),
                source,
            })?;

        // Drain both pipes off-thread; a chatty client must not block on a
        // full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_bounded(&mut child)?;

        // A killed client can leave descendants holding the pipe write ends,
        // which keeps the drain threads blocked. Past the deadline the handles
        // are dropped, not joined; each thread exits once its pipe closes.
        if status == ClientStatus::TimedOut {
            return Ok(ClientOutput {
                status,
                combined: String::new(),
            });
        }

        // An exited client can leave the same stragglers, so the capture
        // gets a short grace rather than an open-ended join.
        let stdout = join_bounded(stdout, PIPE_GRACE);
        let stderr = join_bounded(stderr, PIPE_GRACE);

        Ok(ClientOutput {
            status,
            combined: format!("{}\n{}", stdout, stderr),
        })
    }

    /// Polls the child until it exits or the timeout elapses.
    fn wait_bounded(&self, child: &mut Child) -> Result<ClientStatus, HarnessError> {
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(match status.code() {
                    Some(code) => ClientStatus::Exited(code),
                    None => ClientStatus::Killed,
                });
            }
            if start.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(ClientStatus::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Reads a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if pipe.read_to_end(&mut buf).is_err() {
                buf.clear();
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Collects a drain thread's text, giving up once the grace period ends.
///
/// A thread still blocked past the grace is abandoned; it exits when its
/// pipe closes.
fn join_bounded(handle: thread::JoinHandle<String>, grace: Duration) -> String {
    let start = Instant::now();
    while !handle.is_finished() {
        if start.elapsed() >= grace {
            return String::new();
        }
        thread::sleep(POLL_INTERVAL);
    }
    handle.join().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_client_is_a_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("client");
        let err = ClientRunner::new(&absent, dir.path(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HarnessError::ClientNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_client() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientRunner::new(dir.path(), dir.path(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HarnessError::ClientNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unlaunchable_client_reports_spawn_failure() {
        // A plain file without the executable bit passes the existence check
        // but fails to spawn.
        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("client");
        fs::write(&client, "not a program").unwrap();

        let runner = ClientRunner::new(&client, dir.path(), Duration::from_secs(1)).unwrap();
        let err = runner.run("1.0_basic.nut").unwrap_err();
        assert!(matches!(err, HarnessError::ClientSpawn { .. }));
    }
}
