// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Kernel liveness watching for live-code execution.
//!
//! A recurring check races a kernel-info probe against a short timeout and
//! publishes *transitions* only: going silent emits `Disconnected`, answering
//! again emits `Ready`. Steady states stay quiet, so subscribers can treat
//! every message as a state change.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_TIME_TO_FAILURE: Duration = Duration::from_secs(2);

/// Lifecycle states of the execution kernel.
///
/// The launch pipeline states arrive from the kernel bootstrap itself; the
/// connection checker only ever emits `Ready` and `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStatus {
    Launching,
    Building,
    Built,
    Starting,
    Pushing,
    Ready,
    Failed,
    Disconnected,
}

impl KernelStatus {
    /// User-facing phrase for the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Launching | Self::Building | Self::Built | Self::Starting | Self::Pushing => {
                "Launching"
            }
            Self::Ready => "Active",
            Self::Failed => "Error, try refreshing the page or contact course staff",
            Self::Disconnected => "Disconnected, wait or try refreshing the page",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Launching => "launching",
            Self::Building => "building",
            Self::Built => "built",
            Self::Starting => "starting",
            Self::Pushing => "pushing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
        }
    }

    /// Status marker class for the info container.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Launching => "thebe-status-launching",
            Self::Building => "thebe-status-building",
            Self::Built => "thebe-status-built",
            Self::Starting => "thebe-status-starting",
            Self::Pushing => "thebe-status-pushing",
            Self::Ready => "thebe-status-ready",
            Self::Failed => "thebe-status-failed",
            Self::Disconnected => "thebe-status-disconnected",
        }
    }
}

impl fmt::Display for KernelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKernelStatusError {
    raw: String,
}

impl fmt::Display for ParseKernelStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kernel status '{}'", self.raw)
    }
}

impl std::error::Error for ParseKernelStatusError {}

impl FromStr for KernelStatus {
    type Err = ParseKernelStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "launching" => Ok(Self::Launching),
            "building" => Ok(Self::Building),
            "built" => Ok(Self::Built),
            "starting" => Ok(Self::Starting),
            "pushing" => Ok(Self::Pushing),
            "ready" => Ok(Self::Ready),
            "failed" => Ok(Self::Failed),
            "disconnected" => Ok(Self::Disconnected),
            _ => Err(ParseKernelStatusError { raw: raw.to_owned() }),
        }
    }
}

/// A probe failure; the message is informational only, any failure counts as
/// "no answer".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError {
    message: String,
}

impl ProbeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel probe failed: {}", self.message)
    }
}

impl std::error::Error for ProbeError {}

/// The seam to the real kernel: one request for its info block.
#[async_trait]
pub trait KernelProbe: Send + Sync {
    async fn kernel_info(&self) -> Result<(), ProbeError>;
}

/// Recurring liveness check configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionChecker {
    check_interval: Duration,
    time_to_failure: Duration,
}

impl Default for ConnectionChecker {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            time_to_failure: DEFAULT_TIME_TO_FAILURE,
        }
    }
}

impl ConnectionChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn with_time_to_failure(mut self, time_to_failure: Duration) -> Self {
        self.time_to_failure = time_to_failure;
        self
    }

    /// Starts the checker task. Dropping the returned watch stops it, so
    /// spawning a replacement checker retires the previous one.
    pub fn spawn(
        &self,
        probe: Arc<dyn KernelProbe>,
        previously_connected: bool,
    ) -> ConnectionWatch {
        let initial = if previously_connected {
            KernelStatus::Ready
        } else {
            KernelStatus::Disconnected
        };
        let (tx, rx) = watch::channel(initial);

        let check_interval = self.check_interval;
        let time_to_failure = self.time_to_failure;
        let handle = tokio::spawn(async move {
            let mut connected = previously_connected;
            // The first check runs one full interval in, not immediately.
            let start = time::Instant::now() + check_interval;
            let mut ticker = time::interval_at(start, check_interval);
            loop {
                ticker.tick().await;
                let answered =
                    matches!(time::timeout(time_to_failure, probe.kernel_info()).await, Ok(Ok(())));
                if answered != connected {
                    connected = answered;
                    let status =
                        if connected { KernelStatus::Ready } else { KernelStatus::Disconnected };
                    if tx.send(status).is_err() {
                        break;
                    }
                }
            }
        });

        ConnectionWatch { rx, handle }
    }
}

/// Handle to a running checker: a status subscription plus task ownership.
#[derive(Debug)]
pub struct ConnectionWatch {
    rx: watch::Receiver<KernelStatus>,
    handle: JoinHandle<()>,
}

impl ConnectionWatch {
    /// Last published status (the assumed initial state before any event).
    pub fn status(&self) -> KernelStatus {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<KernelStatus> {
        self.rx.clone()
    }

    /// Waits for the next transition.
    pub async fn changed(&mut self) -> Option<KernelStatus> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for ConnectionWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
