//! Supervision of the single running install process.
//!
//! The supervisor owns at most one child process. Starting a new one kills
//! and reaps the previous one first. Both output pipes are read by their own
//! task and split into lines; the two line feeds fan in to one event channel,
//! keeping each pipe's order but interleaving the pipes in delivery order.
//! An `Exited` event follows the last line of its install.

use super::error::InstallError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Read size for output pipes.
const READ_CHUNK: usize = 8192;

/// Identifies one started install.
pub type InstallId = u64;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Events produced by running installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    Line {
        id: InstallId,
        stream: OutputStream,
        line: String,
    },
    /// The process exited; `code` is `None` when it died from a signal.
    Exited { id: InstallId, code: Option<i32> },
}

/// Returned by [`Supervisor::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallHandle {
    pub id: InstallId,
    pub pid: Option<u32>,
    /// Install that was killed to make room for this one.
    pub superseded: Option<InstallId>,
}

/// Splits a byte stream into lines, holding back an unterminated tail.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Feed a chunk; returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                lines.push(decode_line(&self.pending));
                self.pending.clear();
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush the unterminated tail, if any.
    pub fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| decode_line(&self.pending))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

struct RunningInstall {
    id: InstallId,
    pid: Option<u32>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Owner of the one live install process.
pub struct Supervisor {
    next_id: InstallId,
    current: Option<RunningInstall>,
    path_env: Option<OsString>,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events_rx: mpsc::UnboundedReceiver<SupervisorEvent>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            next_id: 1,
            current: None,
            path_env: None,
            events_tx,
            events_rx,
        }
    }

    /// Give children this `PATH` instead of inheriting ours.
    #[must_use]
    pub fn with_path_env(mut self, path: OsString) -> Self {
        self.path_env = Some(path);
        self
    }

    /// Id of the install started last, until it is cancelled or replaced.
    #[must_use]
    pub fn current(&self) -> Option<InstallId> {
        self.current.as_ref().map(|running| running.id)
    }

    /// Kill any running install, then spawn `binary args…` in `cwd`.
    ///
    /// The previous process is killed and reaped before the new one is
    /// spawned. A spawn failure leaves the supervisor idle.
    pub async fn start(
        &mut self,
        binary: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<InstallHandle, InstallError> {
        let superseded = self.cancel_current().await;

        let mut command = Command::new(binary);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = &self.path_env {
            command.env("PATH", path);
        }

        let mut child = command.spawn().map_err(|source| InstallError::SpawnFailed {
            binary: binary.to_path_buf(),
            source,
        })?;

        let id = self.next_id;
        self.next_id += 1;
        let pid = child.id();

        let readers = [
            child
                .stdout
                .take()
                .map(|pipe| spawn_reader(id, OutputStream::Stdout, pipe, self.events_tx.clone())),
            child
                .stderr
                .take()
                .map(|pipe| spawn_reader(id, OutputStream::Stderr, pipe, self.events_tx.clone())),
        ];
        let readers: Vec<_> = readers.into_iter().flatten().collect();

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(watch_child(
            id,
            child,
            readers,
            cancel_rx,
            self.events_tx.clone(),
        ));

        info!(install_id = id, pid, binary = %binary.display(), "install started");

        self.current = Some(RunningInstall {
            id,
            pid,
            cancel: Some(cancel_tx),
            task,
        });

        Ok(InstallHandle {
            id,
            pid,
            superseded,
        })
    }

    /// Kill the current install, if any, and wait until it is reaped.
    ///
    /// Returns the id of the install that was still running.
    pub async fn cancel_current(&mut self) -> Option<InstallId> {
        let mut running = self.current.take()?;
        let still_running = !running.task.is_finished();

        if let Some(cancel) = running.cancel.take() {
            let _ = cancel.send(());
        }
        if let Err(err) = running.task.await {
            warn!(install_id = running.id, error = %err, "install watcher failed");
        }

        if still_running {
            debug!(install_id = running.id, pid = running.pid, "install cancelled");
            Some(running.id)
        } else {
            None
        }
    }

    /// Wait for the next event from any install.
    ///
    /// Cancel-safe: dropping the future loses no events.
    pub async fn next_event(&mut self) -> Option<SupervisorEvent> {
        self.events_rx.recv().await
    }

    /// Mark the current install as finished after its `Exited` event.
    pub(crate) fn release(&mut self, id: InstallId) {
        if self.current() == Some(id) {
            self.current = None;
        }
    }
}

fn spawn_reader<R>(
    id: InstallId,
    stream: OutputStream,
    pipe: R,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(forward_lines(id, stream, pipe, events))
}

async fn forward_lines<R>(
    id: InstallId,
    stream: OutputStream,
    mut pipe: R,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::default();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in buffer.push(&chunk[..n]) {
                    if events.send(SupervisorEvent::Line { id, stream, line }).is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!(install_id = id, ?stream, error = %err, "output read failed");
                break;
            }
        }
    }

    if let Some(line) = buffer.finish() {
        let _ = events.send(SupervisorEvent::Line { id, stream, line });
    }
}

/// Wait for the child to exit or for cancellation, whichever comes first.
async fn watch_child(
    id: InstallId,
    mut child: Child,
    readers: Vec<JoinHandle<()>>,
    mut cancel: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) {
    let aborts: Vec<_> = readers.iter().map(JoinHandle::abort_handle).collect();

    let status = tokio::select! {
        status = child.wait() => status,
        _ = &mut cancel => {
            if let Err(err) = child.kill().await {
                warn!(install_id = id, error = %err, "failed to kill install");
            }
            aborts.iter().for_each(tokio::task::AbortHandle::abort);
            return;
        }
    };

    // Descendants may hold the pipes open past the child's exit; a
    // cancellation still cuts the drain short.
    let drain = async {
        for reader in readers {
            let _ = reader.await;
        }
    };
    tokio::select! {
        () = drain => {}
        _ = &mut cancel => {
            aborts.iter().for_each(tokio::task::AbortHandle::abort);
            return;
        }
    }

    let code = match status {
        Ok(status) => status.code(),
        Err(err) => {
            warn!(install_id = id, error = %err, "failed to wait for install");
            None
        }
    };
    debug!(install_id = id, ?code, "install exited");
    let _ = events.send(SupervisorEvent::Exited { id, code });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_splits_across_chunks() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(b"hel").is_empty());
        assert_eq!(buffer.push(b"lo\nwor"), vec!["hello"]);
        assert_eq!(buffer.push(b"ld\r\n\nlast"), vec!["world", ""]);
        assert_eq!(buffer.finish(), Some("last".to_string()));
    }

    #[test]
    fn test_line_buffer_finish_empty() {
        let mut buffer = LineBuffer::default();
        assert_eq!(buffer.push(b"done\n"), vec!["done"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_lossy_utf8() {
        let mut buffer = LineBuffer::default();
        let lines = buffer.push(b"caf\xc3\xa9 \xff\n");
        assert_eq!(lines, vec!["café \u{fffd}"]);
    }

    #[test]
    fn test_line_buffer_preserves_content() {
        let input = "a\n  b\n\u{1b}[31mc\u{1b}[0m\nd";
        for split in 0..input.len() {
            let mut buffer = LineBuffer::default();
            let mut lines = buffer.push(&input.as_bytes()[..split]);
            lines.extend(buffer.push(&input.as_bytes()[split..]));
            lines.extend(buffer.finish());
            assert_eq!(lines.join("\n"), input, "split at {split}");
        }
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use std::path::PathBuf;
        use std::time::Duration;

        fn sh() -> PathBuf {
            PathBuf::from("/bin/sh")
        }

        fn script(body: &str) -> Vec<String> {
            vec!["-c".to_string(), body.to_string()]
        }

        fn pid_alive(pid: u32) -> bool {
            std::process::Command::new("/bin/sh")
                .args(["-c", &format!("kill -0 {pid}")])
                .stderr(std::process::Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false)
        }

        async fn collect(
            supervisor: &mut Supervisor,
            id: InstallId,
        ) -> (Vec<(OutputStream, String)>, Option<i32>) {
            let mut lines = Vec::new();
            loop {
                let event = tokio::time::timeout(Duration::from_secs(10), supervisor.next_event())
                    .await
                    .expect("timed out waiting for event")
                    .expect("channel closed");
                match event {
                    SupervisorEvent::Line { id: got, stream, line } if got == id => {
                        lines.push((stream, line));
                    }
                    SupervisorEvent::Exited { id: got, code } if got == id => {
                        return (lines, code);
                    }
                    _ => {}
                }
            }
        }

        #[tokio::test]
        async fn test_merges_both_streams() {
            let mut supervisor = Supervisor::new();
            let cwd = std::env::temp_dir();
            let handle = supervisor
                .start(&sh(), &script("echo out1; echo err1 >&2; echo out2; echo err2 >&2"), &cwd)
                .await
                .unwrap();

            let (lines, code) = collect(&mut supervisor, handle.id).await;
            assert_eq!(code, Some(0));

            let stdout: Vec<_> = lines
                .iter()
                .filter(|(s, _)| *s == OutputStream::Stdout)
                .map(|(_, l)| l.as_str())
                .collect();
            let stderr: Vec<_> = lines
                .iter()
                .filter(|(s, _)| *s == OutputStream::Stderr)
                .map(|(_, l)| l.as_str())
                .collect();
            assert_eq!(stdout, ["out1", "out2"]);
            assert_eq!(stderr, ["err1", "err2"]);
        }

        #[tokio::test]
        async fn test_flushes_unterminated_line() {
            let mut supervisor = Supervisor::new();
            let handle = supervisor
                .start(&sh(), &script("printf 'no newline'"), &std::env::temp_dir())
                .await
                .unwrap();

            let (lines, _) = collect(&mut supervisor, handle.id).await;
            assert_eq!(lines, vec![(OutputStream::Stdout, "no newline".to_string())]);
        }

        #[tokio::test]
        async fn test_reports_exit_code() {
            let mut supervisor = Supervisor::new();
            let handle = supervisor
                .start(&sh(), &script("exit 3"), &std::env::temp_dir())
                .await
                .unwrap();

            let (_, code) = collect(&mut supervisor, handle.id).await;
            assert_eq!(code, Some(3));
        }

        #[tokio::test]
        async fn test_runs_in_working_directory() {
            let dir = tempfile::tempdir().unwrap();
            let mut supervisor = Supervisor::new();
            let handle = supervisor
                .start(&sh(), &script("pwd"), dir.path())
                .await
                .unwrap();

            let (lines, _) = collect(&mut supervisor, handle.id).await;
            let reported = std::fs::canonicalize(&lines[0].1).unwrap();
            assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
        }

        #[tokio::test]
        async fn test_start_kills_previous_process() {
            let mut supervisor = Supervisor::new();
            let cwd = std::env::temp_dir();

            let first = supervisor
                .start(&sh(), &script("sleep 30"), &cwd)
                .await
                .unwrap();
            let first_pid = first.pid.unwrap();
            assert!(pid_alive(first_pid));

            let second = supervisor
                .start(&sh(), &script("echo second"), &cwd)
                .await
                .unwrap();

            assert_eq!(second.superseded, Some(first.id));
            assert!(!pid_alive(first_pid));
            assert_eq!(supervisor.current(), Some(second.id));

            let (lines, code) = collect(&mut supervisor, second.id).await;
            assert_eq!(code, Some(0));
            assert_eq!(lines, vec![(OutputStream::Stdout, "second".to_string())]);
        }

        #[tokio::test]
        async fn test_superseded_install_never_exits() {
            let mut supervisor = Supervisor::new();
            let cwd = std::env::temp_dir();

            let first = supervisor
                .start(&sh(), &script("echo early; sleep 30"), &cwd)
                .await
                .unwrap();
            let second = supervisor
                .start(&sh(), &script("exit 0"), &cwd)
                .await
                .unwrap();

            let mut first_exited = false;
            loop {
                match supervisor.next_event().await.unwrap() {
                    SupervisorEvent::Exited { id, .. } if id == first.id => first_exited = true,
                    SupervisorEvent::Exited { id, .. } if id == second.id => break,
                    _ => {}
                }
            }
            assert!(!first_exited);
        }

        #[tokio::test]
        async fn test_cancel_current() {
            let mut supervisor = Supervisor::new();
            let handle = supervisor
                .start(&sh(), &script("sleep 30"), &std::env::temp_dir())
                .await
                .unwrap();

            assert_eq!(supervisor.cancel_current().await, Some(handle.id));
            assert_eq!(supervisor.current(), None);
            assert!(!pid_alive(handle.pid.unwrap()));
            assert_eq!(supervisor.cancel_current().await, None);
        }

        #[tokio::test]
        async fn test_spawn_failure_leaves_supervisor_idle() {
            let mut supervisor = Supervisor::new();
            let err = supervisor
                .start(
                    Path::new("/nonexistent/depsel-npm"),
                    &[],
                    &std::env::temp_dir(),
                )
                .await
                .unwrap_err();

            assert!(matches!(err, InstallError::SpawnFailed { .. }));
            assert_eq!(supervisor.current(), None);
        }
    }
}
