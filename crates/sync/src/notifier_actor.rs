use std::sync::Arc;

use eyre::eyre;
use otc_actors::{subscribe, Actor, ActorResult, Broadcaster, Consumer, WorkerResult};
use otc_actors_macros::Consumer;
use otc_desk::OtcDesk;
use otc_events::{MessageCacheEvent, SubscriptionRegistry};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, trace, warn};

pub async fn notifier_worker(registry: Arc<SubscriptionRegistry>, cache_events_rx: Broadcaster<MessageCacheEvent>) -> WorkerResult {
    subscribe!(cache_events_rx);

    loop {
        match cache_events_rx.recv().await {
            Ok(msg) => {
                let delivered = registry.dispatch(msg.inner());
                trace!(kind = %msg.inner().kind(), source = msg.source(), delivered, "cache event dispatched");
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "notifier lagged behind cache events"),
            Err(RecvError::Closed) => {
                error!("cache events channel closed");
                break;
            }
        }
    }
    Ok("NotifierWorker finished".to_string())
}

/// Forwards cache events to the callbacks registered in the desk's `SubscriptionRegistry`.
#[derive(Consumer)]
pub struct NotifierActor {
    registry: Arc<SubscriptionRegistry>,
    #[consumer]
    cache_events_rx: Option<Broadcaster<MessageCacheEvent>>,
}

impl NotifierActor {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry, cache_events_rx: None }
    }

    pub fn on_desk(desk: &OtcDesk) -> Self {
        Self { registry: desk.subscriptions(), cache_events_rx: Some(desk.cache_events_channel()) }
    }
}

impl Actor for NotifierActor {
    fn start(&self) -> ActorResult {
        let task = tokio::task::spawn(notifier_worker(
            self.registry.clone(),
            self.cache_events_rx.clone().ok_or(eyre!("NO_CACHE_EVENTS_RX"))?,
        ));
        Ok(vec![task])
    }

    fn name(&self) -> &'static str {
        "NotifierActor"
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use alloy_primitives::{Address, U256};
    use otc_events::{CacheEventKind, CacheEvents};

    use super::*;

    #[tokio::test]
    async fn test_dispatches_to_registered_callbacks() -> eyre::Result<()> {
        let desk = OtcDesk::new(Address::ZERO);
        let filled = Arc::new(AtomicUsize::new(0));
        let counter = filled.clone();
        desk.subscriptions().subscribe(CacheEventKind::OrderFilled, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        desk.subscriptions().subscribe(CacheEventKind::OrderFilled, |_| panic!("broken subscriber"));

        let handles = NotifierActor::on_desk(&desk).start()?;

        let tx = desk.cache_events_channel();
        while tx.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }
        tx.send(MessageCacheEvent::new(CacheEvents::OrderCanceled { id: U256::from(1) }))?;
        tx.send(MessageCacheEvent::new(CacheEvents::OrderFilled { id: U256::from(1) }))?;
        tx.send(MessageCacheEvent::new(CacheEvents::OrderFilled { id: U256::from(2) }))?;

        for _ in 0..200 {
            if filled.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(filled.load(Ordering::SeqCst), 2);

        for handle in handles {
            handle.abort();
        }
        Ok(())
    }

    #[test]
    fn test_start_requires_channel() {
        let actor = NotifierActor::new(Arc::new(SubscriptionRegistry::new()));
        assert!(actor.start().is_err());
    }
}
