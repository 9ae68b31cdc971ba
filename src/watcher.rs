//! # Watcher: wires the bus, subscribers, controller and driver together.
//!
//! ```text
//! Watcher::start(cfg, source, renderer, subscribers)
//!   ├─► Bus::new(cfg.bus_capacity)
//!   ├─► SubscriberSet::listen(bus.subscribe())        (before anything publishes)
//!   ├─► PollController::spawn(cfg, source, renderer)  → ControllerHandle
//!   └─► IntervalDriver::spawn(cfg.poll_interval)      → first poll right away
//!
//! Watcher::shutdown()
//!   ├─► stop driver                (no new ticks)
//!   ├─► handle.dispose()           (pending poll dropped, ControllerStopped published)
//!   └─► stop listener              (buffered events delivered, workers joined)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use presencewatch::{Config, HtmlRenderer, LanyardClient, LogWriter, Subscribe, Watcher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let (renderer, mut fragments) = HtmlRenderer::new(cfg.user_id.clone());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let watcher = Watcher::start(
//!         &cfg,
//!         Arc::new(LanyardClient::new(&cfg)?),
//!         Arc::new(renderer),
//!         subs,
//!     );
//!
//!     fragments.changed().await?;
//!     println!("{}", *fragments.borrow());
//!
//!     watcher.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::controller::{ControllerHandle, IntervalDriver, PollController};
use crate::events::Bus;
use crate::render::Render;
use crate::source::PresenceSource;
use crate::subscribers::{Subscribe, SubscriberSet};

/// A running presence poller.
pub struct Watcher {
    handle: ControllerHandle,
    driver_token: CancellationToken,
    driver: JoinHandle<()>,
    listener_token: CancellationToken,
    listener: JoinHandle<()>,
}

impl Watcher {
    /// Starts every component. Must be called from within a tokio runtime.
    pub fn start(
        cfg: &Config,
        source: Arc<dyn PresenceSource>,
        renderer: Arc<dyn Render>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());

        let listener_token = CancellationToken::new();
        let listener =
            SubscriberSet::new(subscribers, bus.clone()).listen(bus.subscribe(), listener_token.clone());

        let handle = PollController::spawn(cfg, source, renderer, bus.clone());

        let driver_token = CancellationToken::new();
        let driver = IntervalDriver::new(handle.clone(), cfg.poll_interval, bus)
            .spawn(driver_token.clone());

        Self {
            handle,
            driver_token,
            driver,
            listener_token,
            listener,
        }
    }

    /// Handle for manual retries, extra polls and phase observation.
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Stops the driver, disposes the controller and flushes subscribers.
    pub async fn shutdown(self) {
        self.driver_token.cancel();
        let _ = self.driver.await;

        self.handle.dispose().await;

        self.listener_token.cancel();
        let _ = self.listener.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::error::{ControllerError, PollError, RenderError};
    use crate::events::{Event, EventKind};
    use crate::source::PresencePayload;

    struct AlwaysOnline;

    #[async_trait]
    impl PresenceSource for AlwaysOnline {
        fn endpoint(&self) -> &str {
            "test://online"
        }

        async fn fetch(&self) -> Result<PresencePayload, PollError> {
            Ok(PresencePayload::ok(json!({ "discord_status": "online" })))
        }
    }

    #[derive(Default)]
    struct Count(Mutex<usize>);

    #[async_trait]
    impl Render for Count {
        async fn on_data(&self, _: &Value) -> Result<(), RenderError> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }

        async fn on_error(&self, _: &str) {}
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_schedule_and_flushes_on_shutdown() {
        let renderer = Arc::new(Count::default());
        let recorder = Arc::new(Recorder::default());
        let watcher = Watcher::start(
            &Config::default(),
            Arc::new(AlwaysOnline),
            renderer.clone(),
            vec![recorder.clone() as Arc<dyn Subscribe>],
        );
        let handle = watcher.handle();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(*renderer.0.lock().unwrap(), 2);

        watcher.shutdown().await;
        assert_eq!(handle.poll().await, Err(ControllerError::Closed));

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(
            seen.iter().filter(|k| **k == EventKind::PollSucceeded).count(),
            2
        );
        assert_eq!(seen.last(), Some(&EventKind::ControllerStopped));
    }
}
