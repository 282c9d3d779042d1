//! Local emulator process supervisor.
//!
//! Turns the emulator executable's output streams into a lifecycle-aware
//! event stream:
//! - one [`EmulatorEvent::Log`] per stdout line while logging is enabled,
//! - a single [`EmulatorEvent::Ready`] when the readiness marker appears,
//!   flipping the session to [`EmulatorState::Started`],
//! - a terminal [`EmulatorEvent::Error`] if the process writes to stderr.
//!
//! The stream never completes on its own; the emulator runs until [`stop`]
//! is called. Dropping the stream detaches the observer without touching
//! the process.
//!
//! [`stop`]: Emulator::stop

pub mod process;

pub use process::{ProcessHandle, ProcessSpawner, SpawnedProcess, TokioSpawner};

use crate::config::EmulatorConfig;
use crate::HarnessError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Lifecycle state of the emulator session.
///
/// Transitions are monotonic per spawn: Stopped → Starting → Started, and
/// back to Stopped only through [`Emulator::stop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmulatorState {
    Stopped,
    Starting,
    Started,
}

/// One observation from the emulator's output streams.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmulatorEvent {
    /// A stdout line, emitted only when the session was started with
    /// logging enabled.
    Log(String),
    /// The readiness marker was observed; the emulator accepts requests.
    Ready,
    /// The process wrote to stderr. Terminal: no events follow.
    Error(String),
}

/// Subscription to a running emulator session.
///
/// Dropping the subscription detaches this observer; the process keeps
/// running until [`Emulator::stop`].
#[derive(Debug)]
pub struct EmulatorEvents {
    rx: mpsc::UnboundedReceiver<EmulatorEvent>,
    terminated: bool,
}

impl EmulatorEvents {
    /// Next event, or `None` once the session was stopped (or after a
    /// terminal [`EmulatorEvent::Error`]).
    pub async fn next(&mut self) -> Option<EmulatorEvent> {
        if self.terminated {
            return None;
        }
        let event = self.rx.recv().await;
        if matches!(event, Some(EmulatorEvent::Error(_))) {
            self.terminated = true;
        }
        event
    }

    /// Drain the stream until the readiness marker is observed.
    pub async fn wait_until_ready(&mut self) -> crate::Result<()> {
        loop {
            match self.next().await {
                Some(EmulatorEvent::Ready) => return Ok(()),
                Some(EmulatorEvent::Log(_)) => {}
                Some(EmulatorEvent::Error(e)) => {
                    anyhow::bail!("emulator wrote to stderr before becoming ready: {e}")
                }
                None => anyhow::bail!("emulator stream ended before the readiness marker was seen"),
            }
        }
    }
}

/// Supervises one emulator child process.
///
/// The supervisor exclusively owns the subprocess handle; no other
/// component reads or writes its streams.
pub struct Emulator {
    config: EmulatorConfig,
    spawner: Box<dyn ProcessSpawner>,
    state: Arc<Mutex<EmulatorState>>,
    handle: Option<Box<dyn ProcessHandle>>,
    readers: Vec<JoinHandle<()>>,
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        Self::with_spawner(config, Box::new(TokioSpawner))
    }

    /// Build a supervisor over an injected process spawner. Tests use this
    /// to substitute an in-memory fake subprocess.
    pub fn with_spawner(config: EmulatorConfig, spawner: Box<dyn ProcessSpawner>) -> Self {
        Self {
            config,
            spawner,
            state: Arc::new(Mutex::new(EmulatorState::Stopped)),
            handle: None,
            readers: Vec::new(),
        }
    }

    pub fn state(&self) -> EmulatorState {
        *self.state.lock()
    }

    /// Spawn the emulator process and subscribe to its event stream.
    ///
    /// The logging flag is captured here and fixed for the session. Fails
    /// with [`HarnessError::EmulatorRunning`] if a process is already live,
    /// rather than spawning a second instance into the same ports.
    pub fn start(&mut self, logging: bool) -> crate::Result<EmulatorEvents> {
        if *self.state.lock() != EmulatorState::Stopped {
            return Err(HarnessError::EmulatorRunning.into());
        }

        info!(program = %self.config.program, "starting emulator");
        let SpawnedProcess {
            stdout,
            stderr,
            handle,
        } = self.spawner.spawn(&self.config.program, &self.config.args)?;
        *self.state.lock() = EmulatorState::Starting;

        let (tx, rx) = mpsc::unbounded_channel();

        let marker = self.config.ready_marker.clone();
        let state = self.state.clone();
        let stdout_tx = tx.clone();
        let stdout_reader = tokio::spawn(async move {
            // Sends to a detached subscriber fail; keep draining anyway so
            // the child never blocks on a full pipe.
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if logging {
                    let _ = stdout_tx.send(EmulatorEvent::Log(line.clone()));
                }
                if line.contains(&marker) {
                    debug!("readiness marker observed");
                    *state.lock() = EmulatorState::Started;
                    let _ = stdout_tx.send(EmulatorEvent::Ready);
                }
            }
        });

        let stderr_reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx.send(EmulatorEvent::Error(line));
            }
        });

        self.handle = Some(handle);
        self.readers = vec![stdout_reader, stderr_reader];

        Ok(EmulatorEvents {
            rx,
            terminated: false,
        })
    }

    /// Terminate the emulator process and return to `Stopped`.
    ///
    /// The stream emits nothing after this returns. Calling `stop` without a
    /// running process is a no-op.
    pub async fn stop(&mut self) -> crate::Result<()> {
        if *self.state.lock() == EmulatorState::Stopped {
            return Ok(());
        }

        // Silence the stream before the kill so the process's death throes
        // never reach subscribers.
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        if let Some(mut handle) = self.handle.take() {
            handle.kill().await?;
        }
        *self.state.lock() = EmulatorState::Stopped;
        info!("emulator stopped");
        Ok(())
    }
}
