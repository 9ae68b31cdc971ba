//! Fixed-period poll driver.
//!
//! Requests one poll per tick through [`ControllerHandle::try_poll`]. The first
//! tick fires immediately. A tick that finds a poll still queued is dropped and
//! reported as `TickSkipped`, so a slow request never builds a backlog. The
//! driver keeps ticking in every phase, `Terminal` included.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::controller::core::ControllerHandle;
use crate::error::ControllerError;
use crate::events::{Bus, Event, EventKind};

/// Periodic source of external polls.
pub struct IntervalDriver {
    handle: ControllerHandle,
    period: Duration,
    bus: Bus,
}

impl IntervalDriver {
    /// `period` is clamped to at least 1ms.
    pub fn new(handle: ControllerHandle, period: Duration, bus: Bus) -> Self {
        Self {
            handle,
            period: period.max(Duration::from_millis(1)),
            bus,
        }
    }

    /// Runs the driver on its own task until `token` is cancelled or the
    /// controller closes.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(token))
    }

    pub async fn run(self, token: CancellationToken) {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => match self.handle.try_poll() {
                    Ok(()) => {}
                    Err(ControllerError::Full) => {
                        self.bus.publish(Event::new(EventKind::TickSkipped));
                    }
                    Err(ControllerError::Closed) => {
                        debug!("controller closed, driver stopping");
                        break;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::time::Instant;

    use crate::config::Config;
    use crate::controller::core::PollController;
    use crate::error::{PollError, RenderError};
    use crate::render::Render;
    use crate::source::{PresencePayload, PresenceSource};

    #[derive(Default)]
    struct Counting {
        calls: Mutex<Vec<Instant>>,
        hang: bool,
    }

    #[async_trait]
    impl PresenceSource for Counting {
        fn endpoint(&self) -> &str {
            "test://counting"
        }

        async fn fetch(&self) -> Result<PresencePayload, PollError> {
            self.calls.lock().unwrap().push(Instant::now());
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(PresencePayload::ok(json!({})))
        }
    }

    struct Quiet;

    #[async_trait]
    impl Render for Quiet {
        async fn on_data(&self, _: &Value) -> Result<(), RenderError> {
            Ok(())
        }

        async fn on_error(&self, _: &str) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period_starting_now() {
        let bus = Bus::new(64);
        let source = Arc::new(Counting::default());
        let handle = PollController::spawn(&Config::default(), source.clone(), Arc::new(Quiet), bus.clone());
        let token = CancellationToken::new();
        let driver = IntervalDriver::new(handle.clone(), Duration::from_secs(30), bus).spawn(token.clone());

        time::sleep(Duration::from_secs(65)).await;
        token.cancel();
        driver.await.unwrap();

        let calls = source.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1] - calls[0], Duration::from_secs(30));
        assert_eq!(calls[2] - calls[0], Duration::from_secs(60));

        handle.dispose().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_coalesces_ticks() {
        let bus = Bus::new(64);
        let mut events = bus.subscribe();
        let source = Arc::new(Counting {
            hang: true,
            ..Counting::default()
        });
        let cfg = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };
        let handle = PollController::spawn(&cfg, source.clone(), Arc::new(Quiet), bus.clone());
        let token = CancellationToken::new();
        let driver = IntervalDriver::new(handle.clone(), Duration::from_secs(30), bus).spawn(token.clone());

        loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == EventKind::TickSkipped {
                break;
            }
        }
        assert_eq!(source.calls.lock().unwrap().len(), 1);

        token.cancel();
        driver.await.unwrap();
        handle.dispose().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_controller_closes() {
        let bus = Bus::new(64);
        let handle = PollController::spawn(
            &Config::default(),
            Arc::new(Counting::default()),
            Arc::new(Quiet),
            bus.clone(),
        );
        handle.dispose().await;

        let driver = IntervalDriver::new(handle, Duration::from_secs(30), bus)
            .spawn(CancellationToken::new());
        driver.await.unwrap();
    }
}
