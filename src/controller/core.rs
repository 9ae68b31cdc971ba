//! # PollController: fetch-and-retry loop.
//!
//! One tokio task owns [`RetryState`] and serves commands from its
//! [`ControllerHandle`]s together with its own pending-poll timer:
//!
//! ```text
//! loop select! {
//!   ├─► cancelled            → exit (pending poll dropped)
//!   ├─► Command::Poll        → poll()
//!   ├─► Command::ManualRetry → manual_retry()
//!   └─► pending deadline     → poll()
//! }
//!
//! poll():
//!   fetch (bounded by request timeout)
//!     ├─ Ok, success=true  → reset state → on_data(data)                  → Idle
//!     ├─ Ok, success=false → fail(Application)
//!     └─ Err(e)            → fail(e)
//!
//! fail(e):
//!   cancel pending, count += 1
//!     ├─ count ≤ max → on_error("Connection error (e) - retrying in Ns...") → Backoff
//!     └─ count > max → on_error("Cannot connect (e). Please reload...")   → Terminal
//! ```
//!
//! ## Rules
//! - Fetches never overlap: the task awaits each one before serving anything else.
//! - At most one pending poll; every transition replaces or clears it.
//! - Exactly one renderer callback per poll, failure or manual retry.
//! - Renderer errors and panics are reported as `RenderFailed` and never touch
//!   the retry state.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::controller::state::{Phase, RetryState};
use crate::error::{panic_message, ControllerError, PollError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{RetryDecision, RetryPolicy};
use crate::render::Render;
use crate::source::{PresencePayload, PresenceSource};

/// Notice shown right after a manual retry.
pub const RECONNECTING: &str = "Reconnecting...";

/// Notice for a failure that will be retried after `delay`.
pub fn retrying_notice(err: &PollError, delay: Duration) -> String {
    let secs = (delay.as_millis() + 500) / 1000;
    format!("Connection error ({err}) - retrying in {secs} seconds...")
}

/// Notice for a failure past the retry ceiling.
pub fn terminal_notice(err: &PollError) -> String {
    format!("Cannot connect ({err}). Please reload the page.")
}

#[derive(Debug)]
enum Command {
    Poll,
    ManualRetry,
}

/// Handle to a running [`PollController`]. Cheap to clone.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Command>,
    phase: watch::Receiver<Phase>,
    token: CancellationToken,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ControllerHandle {
    /// Requests one poll, waiting for queue space.
    pub async fn poll(&self) -> Result<(), ControllerError> {
        self.send(Command::Poll).await
    }

    /// Requests one poll unless one is already queued.
    pub fn try_poll(&self) -> Result<(), ControllerError> {
        if self.token.is_cancelled() {
            return Err(ControllerError::Closed);
        }
        self.tx.try_send(Command::Poll).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ControllerError::Full,
            mpsc::error::TrySendError::Closed(_) => ControllerError::Closed,
        })
    }

    /// Resets the failure count and schedules a poll after the manual retry delay.
    ///
    /// Works from any phase, including `Terminal`.
    pub async fn manual_retry(&self) -> Result<(), ControllerError> {
        self.send(Command::ManualRetry).await
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.clone()
    }

    /// Stops the controller, drops any pending poll and waits for the task to exit.
    ///
    /// Idempotent; later commands fail with [`ControllerError::Closed`].
    pub async fn dispose(&self) {
        self.token.cancel();
        if let Some(join) = self.join.lock().await.take() {
            let _ = join.await;
        }
    }

    async fn send(&self, cmd: Command) -> Result<(), ControllerError> {
        if self.token.is_cancelled() {
            return Err(ControllerError::Closed);
        }
        self.tx.send(cmd).await.map_err(|_| ControllerError::Closed)
    }
}

/// The fetch-and-retry controller. Create it with [`PollController::spawn`].
pub struct PollController {
    source: Arc<dyn PresenceSource>,
    renderer: Arc<dyn Render>,
    bus: Bus,
    retry: RetryPolicy,
    manual_retry_delay: Duration,
    fetch_timeout: Option<Duration>,
    state: RetryState,
    phase: watch::Sender<Phase>,
}

impl PollController {
    /// Starts the controller task in phase `Idle` and returns its handle.
    ///
    /// Nothing is fetched until someone calls [`ControllerHandle::poll`]
    /// (usually the [`IntervalDriver`](crate::IntervalDriver)).
    pub fn spawn(
        cfg: &Config,
        source: Arc<dyn PresenceSource>,
        renderer: Arc<dyn Render>,
        bus: Bus,
    ) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(cfg.command_capacity_clamped());
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);
        let token = CancellationToken::new();

        let controller = Self {
            source,
            renderer,
            bus,
            retry: cfg.retry,
            manual_retry_delay: cfg.manual_retry_delay,
            fetch_timeout: cfg.fetch_timeout(),
            state: RetryState::new(),
            phase: phase_tx,
        };
        let join = tokio::spawn(controller.run(rx, token.clone()));

        ControllerHandle {
            tx,
            phase: phase_rx,
            token,
            join: Arc::new(Mutex::new(Some(join))),
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>, token: CancellationToken) {
        loop {
            let deadline = self.state.deadline();
            let pending = async move {
                match deadline {
                    Some(at) => time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                cmd = rx.recv() => match cmd {
                    Some(Command::Poll) => self.poll(&token).await,
                    Some(Command::ManualRetry) => self.manual_retry().await,
                    None => break,
                },
                _ = pending => {
                    self.state.cancel_pending();
                    self.poll(&token).await;
                }
            }
        }

        if self.state.cancel_pending() {
            self.publish_cancelled("dispose");
        }
        self.bus.publish(Event::new(EventKind::ControllerStopped));
    }

    async fn poll(&mut self, token: &CancellationToken) {
        self.phase.send_replace(Phase::Polling);
        self.bus.publish(
            Event::new(EventKind::PollStarting)
                .with_source(self.source.endpoint())
                .with_attempt(self.state.attempt_count()),
        );

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.phase.send_replace(Phase::Idle);
                return;
            }
            res = self.fetch() => res,
        };

        match outcome {
            Ok(payload) if payload.success => self.succeed(payload.data).await,
            Ok(payload) => {
                self.fail(PollError::Application {
                    body: payload.body(),
                })
                .await
            }
            Err(err) => self.fail(err).await,
        }
    }

    async fn fetch(&self) -> Result<PresencePayload, PollError> {
        match self.fetch_timeout {
            Some(limit) => time::timeout(limit, self.source.fetch())
                .await
                .unwrap_or(Err(PollError::Timeout { timeout: limit })),
            None => self.source.fetch().await,
        }
    }

    async fn succeed(&mut self, data: Value) {
        if self.state.on_success() {
            self.publish_cancelled("success");
        }

        let rendered = AssertUnwindSafe(self.renderer.on_data(&data))
            .catch_unwind()
            .await;

        self.phase.send_replace(Phase::Idle);
        self.bus.publish(Event::new(EventKind::PollSucceeded).with_source(self.source.endpoint()));

        match rendered {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.publish_render_failed(e.to_string()),
            Err(panic) => self.publish_render_failed(format!(
                "renderer panicked: {}",
                panic_message(panic.as_ref())
            )),
        }
    }

    async fn fail(&mut self, err: PollError) {
        let (decision, cancelled) = self.state.on_failure(&self.retry, Instant::now());
        if cancelled {
            self.publish_cancelled("failure");
        }

        let reason = err.to_string();
        self.bus.publish(
            Event::new(EventKind::PollFailed)
                .with_source(self.source.endpoint())
                .with_attempt(self.state.attempt_count())
                .with_reason(reason.as_str())
                .with_label(err.as_label()),
        );

        match decision {
            RetryDecision::Retry { attempt, delay } => {
                self.notify(&retrying_notice(&err, delay)).await;
                self.phase.send_replace(Phase::Backoff { attempt, delay });
                self.bus.publish(
                    Event::new(EventKind::RetryScheduled)
                        .with_attempt(attempt)
                        .with_delay(delay)
                        .with_reason(reason),
                );
            }
            RetryDecision::GiveUp { attempt } => {
                self.notify(&terminal_notice(&err)).await;
                self.phase.send_replace(Phase::Terminal { attempt });
                self.bus.publish(
                    Event::new(EventKind::RetriesExhausted)
                        .with_attempt(attempt)
                        .with_reason(reason),
                );
            }
        }
    }

    async fn manual_retry(&mut self) {
        let delay = self.manual_retry_delay;
        if self.state.on_manual_retry(delay, Instant::now()) {
            self.publish_cancelled("manual");
        }

        self.notify(RECONNECTING).await;
        self.phase.send_replace(Phase::Backoff { attempt: 0, delay });
        self.bus
            .publish(Event::new(EventKind::ManualRetry).with_delay(delay));
    }

    async fn notify(&self, message: &str) {
        let shown = AssertUnwindSafe(self.renderer.on_error(message))
            .catch_unwind()
            .await;
        if let Err(panic) = shown {
            self.publish_render_failed(format!(
                "renderer panicked: {}",
                panic_message(panic.as_ref())
            ));
        }
    }

    fn publish_cancelled(&self, by: &'static str) {
        self.bus
            .publish(Event::new(EventKind::PendingCancelled).with_reason(by));
    }

    fn publish_render_failed(&self, reason: String) {
        self.bus
            .publish(Event::new(EventKind::RenderFailed).with_reason(reason));
    }
}
