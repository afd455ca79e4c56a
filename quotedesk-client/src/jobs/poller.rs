use crate::store::{RequestTag, TicketStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Background refresh of the ticket list on a fixed interval.
///
/// Polls are tagged `Background` so they never drive the loading indicator, and a
/// failed poll is logged and retried on the next tick.
pub struct TicketPoller {
    store: Arc<TicketStore>,
    interval: Duration,
    shutting_down: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TicketPoller {
    pub fn new(store: Arc<TicketStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            shutting_down: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Starts polling. The first refresh happens immediately.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        self.shutting_down.store(false, Ordering::SeqCst);

        let store = Arc::clone(&self.store);
        let shutting_down = Arc::clone(&self.shutting_down);
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if shutting_down.load(Ordering::SeqCst) {
                    break;
                }
                match store.refetch(RequestTag::Background).await {
                    Ok(count) => tracing::debug!("Polled {} tickets", count),
                    Err(e) => tracing::error!("Periodic ticket refresh failed: {}", e),
                }
            }
        }));
        tracing::info!("Polling tickets every {:?}", period);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Stops polling; a refresh already in flight is abandoned
    pub async fn shutdown(&mut self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        tracing::info!("Ticket polling stopped");
    }
}
