use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::error::EngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of one finished process.
#[derive(Debug)]
pub struct Captured {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` to completion, killing it once `timeout` elapses.
///
/// Both pipes are drained on their own threads so a chatty child (image
/// pulls, builds) can't block on a full pipe while we poll. The child runs
/// in its own process group so helpers it spawns (e.g. the buildx plugin)
/// die with it on timeout.
pub fn run(program: &str, args: &[String], timeout: Duration) -> Result<Captured, EngineError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let mut child = command.spawn()?;

    let stdout_handle = child.stdout.take().map(|s| thread::spawn(move || drain(s)));
    let stderr_handle = child.stderr.take().map(|s| thread::spawn(move || drain(s)));

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                return Err(e.into());
            }
        }
        if start.elapsed() > timeout {
            terminate(&mut child);
            // Readers stay detached: a descendant outside the group may
            // still hold the pipes open.
            return Err(EngineError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Captured {
        success: status.success(),
        exit_code: status.code(),
        stdout: join(stdout_handle),
        stderr: join(stderr_handle),
    })
}

/// Kill the child's whole process group, then reap the child.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: kill(2) with a negative pid only signals the group we
        // created at spawn; it touches no memory.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read>(mut reader: R) -> String {
    let mut buf = Vec::new();
    // A read error just truncates the capture; the exit status still decides.
    let _ = reader.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".into(), script.into()]
    }

    #[test]
    fn captures_both_streams() {
        let out = run("sh", &sh("echo out; echo err >&2"), Duration::from_secs(10)).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[test]
    fn reports_exit_code() {
        let out = run("sh", &sh("exit 3"), Duration::from_secs(10)).unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
    }

    #[test]
    fn kills_on_timeout() {
        let err = run("sh", &sh("exec sleep 5"), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)));
    }

    #[test]
    fn timeout_kills_grandchildren_holding_the_pipes() {
        let start = Instant::now();
        let err = run("sh", &sh("sleep 4; true"), Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)));
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "timed-out run took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn missing_program_is_io_error() {
        let err = run("definitely-not-a-real-binary-xyz", &[], Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
