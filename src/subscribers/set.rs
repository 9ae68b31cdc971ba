//! # Non-blocking event fan-out.
//!
//! [`SubscriberSet`] hands every event to each subscriber's bounded queue with
//! `try_send`; one worker per subscriber drains its queue.
//!
//! ```text
//! Bus ──► listener ──► emit(event)
//!                         ├──► [queue 1] ──► worker 1 ──► sub1.on_event()
//!                         │                     └──────► panic → SubscriberPanicked
//!                         └──► [queue N] ──► worker N ──► subN.on_event()
//! ```
//!
//! ## Rules
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Isolation**: panics are caught per event; the worker keeps going
//! - **Per-subscriber FIFO**

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let worker_bus = bus.clone();

            workers.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
                        worker_bus.publish(Event::subscriber_panicked(
                            sub.name(),
                            panic_message(panic.as_ref()),
                        ));
                    }
                }
            }));
            channels.push(SubscriberChannel { name, sender: tx });
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Offers `event` to every subscriber without waiting.
    ///
    /// Overflow of an overflow event is not re-reported, which keeps a stuck
    /// subscriber from feeding the bus forever.
    pub fn emit(&self, event: Event) {
        let is_internal = event.is_subscriber_internal();
        let event = Arc::new(event);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_internal {
                self.bus
                    .publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Spawns the listener that forwards bus events until `token` is cancelled.
    ///
    /// Pass a receiver created **before** anything publishes, or early events are
    /// missed. On cancellation, already buffered events are still delivered, then
    /// the workers are drained and joined.
    pub fn listen(
        self,
        mut rx: broadcast::Receiver<Event>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.emit(ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            while let Ok(ev) = rx.try_recv() {
                self.emit(ev);
            }
            self.shutdown().await;
        })
    }

    /// Closes every queue and waits for the workers to finish.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, ev: &Event) {
            if matches!(ev.kind, EventKind::PollFailed) {
                panic!("cannot handle failures");
            }
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn test_listener_delivers_in_order_and_drains_on_cancel() {
        let bus = Bus::new(16);
        let recorder = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![recorder.clone() as Arc<dyn Subscribe>], bus.clone());
        let token = CancellationToken::new();
        let listener = set.listen(bus.subscribe(), token.clone());

        bus.publish(Event::new(EventKind::PollStarting));
        bus.publish(Event::new(EventKind::PollSucceeded));
        token.cancel();
        listener.await.unwrap();

        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![EventKind::PollStarting, EventKind::PollSucceeded]
        );
    }

    #[tokio::test]
    async fn test_panic_is_reported_and_worker_survives() {
        let bus = Bus::new(16);
        let mut observer = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicky) as Arc<dyn Subscribe>], bus.clone());

        set.emit(Event::new(EventKind::PollFailed));
        let ev = observer.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.source.as_deref(), Some("panicky"));
        assert_eq!(ev.reason.as_deref(), Some("cannot handle failures"));

        set.emit(Event::new(EventKind::PollSucceeded));
        set.shutdown().await;
    }
}
