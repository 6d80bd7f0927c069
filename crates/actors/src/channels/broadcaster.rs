use tokio::sync::broadcast;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::broadcast::Receiver;

/// Cloneable multi-consumer channel handle. Receivers are created on demand.
#[derive(Clone)]
pub struct Broadcaster<T>
where
    T: Clone + Send + Sync + 'static,
{
    sender: broadcast::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Broadcaster<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fails only when nobody is subscribed.
    pub fn send(&self, value: T) -> Result<usize, SendError<T>> {
        self.sender.send(value)
    }

    pub fn subscribe(&self) -> Receiver<T> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let channel: Broadcaster<u32> = Broadcaster::new(4);
        assert!(channel.send(1).is_err());

        let mut rx_a = channel.subscribe();
        let mut rx_b = channel.clone().subscribe();
        assert_eq!(channel.send(2).unwrap(), 2);
        assert_eq!(rx_a.recv().await.unwrap(), 2);
        assert_eq!(rx_b.recv().await.unwrap(), 2);
    }
}
