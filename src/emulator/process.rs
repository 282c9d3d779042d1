//! The subprocess seam behind the emulator supervisor.
//!
//! The supervisor never touches `tokio::process` directly; it talks to a
//! [`ProcessSpawner`], so tests can substitute an in-memory process whose
//! output streams they script.

use anyhow::Context;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::Command;

/// Exclusive handle to a spawned process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Terminate the process. Idempotent on an already-dead child.
    async fn kill(&mut self) -> crate::Result<()>;
}

/// Capability to spawn the emulator executable.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, program: &str, args: &[String]) -> crate::Result<SpawnedProcess>;
}

/// A live child process: its output streams plus the kill handle.
pub struct SpawnedProcess {
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
    pub handle: Box<dyn ProcessHandle>,
}

/// Spawns real child processes via [`tokio::process`].
pub struct TokioSpawner;

impl ProcessSpawner for TokioSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> crate::Result<SpawnedProcess> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn '{program}'"))?;

        let stdout = child
            .stdout
            .take()
            .context("child stdout was not captured")?;
        let stderr = child
            .stderr
            .take()
            .context("child stderr was not captured")?;

        Ok(SpawnedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            handle: Box::new(TokioProcessHandle { child }),
        })
    }
}

struct TokioProcessHandle {
    child: tokio::process::Child,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn kill(&mut self) -> crate::Result<()> {
        self.child
            .kill()
            .await
            .context("failed to kill emulator process")
    }
}
