use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Observable value holder: the current value plus change notification.
/// Reads go through the watch channel, change signals through a broadcast
/// channel so any number of observers can wait independently.
pub struct Property<T: Clone + Send + Sync> {
    watch_sender: Arc<watch::Sender<T>>,
    watch_receiver: watch::Receiver<T>,
    broadcast_sender: broadcast::Sender<()>,
    name: String,
}

pub struct PropertySubscriber {
    receiver: broadcast::Receiver<()>,
}

// PropertySubscriber intentionally does not implement Clone.
// To get multiple subscribers, call Property::subscribe() multiple times.

impl PropertySubscriber {
    pub async fn wait_for_change(&mut self) -> bool {
        loop {
            match self.receiver.recv().await {
                Ok(_) => return true,
                // If we lagged behind, skip to the latest and keep waiting
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                // Channel closed: no more updates
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }

    pub fn try_recv(&mut self) -> bool {
        match self.receiver.try_recv() {
            Ok(_) => true,
            Err(broadcast::error::TryRecvError::Empty) => false,
            // Consider lag as a change signal; the next recv() will align
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(broadcast::error::TryRecvError::Closed) => false,
        }
    }
}

impl<T: Clone + Send + Sync> Property<T> {
    pub fn new(initial_value: T, name: impl Into<String>) -> Self {
        let (watch_sender, watch_receiver) = watch::channel(initial_value);
        let (broadcast_sender, _) = broadcast::channel(100);
        Self {
            watch_sender: Arc::new(watch_sender),
            watch_receiver,
            broadcast_sender,
            name: name.into(),
        }
    }

    pub async fn get(&self) -> T {
        self.watch_receiver.borrow().clone()
    }

    /// Synchronous read. Safe from any context since the value is already in
    /// memory behind the watch channel.
    pub fn get_sync(&self) -> T {
        self.watch_receiver.borrow().clone()
    }

    pub async fn set(&self, new_value: T) {
        let _ = self.watch_sender.send(new_value);
        let _ = self.broadcast_sender.send(());
    }

    pub async fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        let mut new_value = self.watch_receiver.borrow().clone();
        updater(&mut new_value);
        let _ = self.watch_sender.send(new_value);
        let _ = self.broadcast_sender.send(());
    }

    pub fn subscribe(&self) -> PropertySubscriber {
        PropertySubscriber {
            receiver: self.broadcast_sender.subscribe(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Clone + Send + Sync> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            watch_sender: self.watch_sender.clone(),
            watch_receiver: self.watch_receiver.clone(),
            broadcast_sender: self.broadcast_sender.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + Debug> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Property({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, sleep, timeout};

    #[tokio::test]
    async fn test_get_set() {
        let prop = Property::new(42i32, "answer");
        assert_eq!(prop.get().await, 42);

        prop.set(7).await;
        assert_eq!(prop.get().await, 7);
        assert_eq!(prop.get_sync(), 7);
        assert_eq!(prop.name(), "answer");
    }

    #[tokio::test]
    async fn test_update() {
        let prop = Property::new(vec![1, 2], "list");
        prop.update(|v| v.push(3)).await;
        assert_eq!(prop.get().await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_set() {
        let prop = Property::new(0u32, "counter");
        let mut subscriber = prop.subscribe();

        prop.set(1).await;
        let changed = timeout(Duration::from_millis(100), subscriber.wait_for_change())
            .await
            .expect("subscriber should be notified");
        assert!(changed);
        assert_eq!(prop.get().await, 1);
    }

    #[tokio::test]
    async fn test_try_recv_without_change() {
        let prop = Property::new(0u32, "counter");
        let mut subscriber = prop.subscribe();

        assert!(!subscriber.try_recv());
        prop.set(5).await;
        sleep(Duration::from_millis(10)).await;
        assert!(subscriber.try_recv());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let prop = Property::new("initial".to_string(), "text");
        let mut sub1 = prop.subscribe();
        let mut sub2 = prop.subscribe();

        prop.set("changed".to_string()).await;

        for sub in [&mut sub1, &mut sub2] {
            let changed = timeout(Duration::from_millis(100), sub.wait_for_change())
                .await
                .expect("all subscribers should be notified");
            assert!(changed);
        }
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let prop = Property::new(1i32, "shared");
        let clone = prop.clone();

        clone.set(2).await;
        assert_eq!(prop.get().await, 2);
    }
}
