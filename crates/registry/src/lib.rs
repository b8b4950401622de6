//! Connection registry for routing broadcast events to live sessions.
//!
//! Maintains the mapping from a logical group (one chat, or one user's
//! notification stream) to the set of currently attached sessions, and
//! delivers an event to every member of a group. This is the single shared
//! mutable resource of the realtime layer: every session task and every
//! external producer goes through it.
//!
//! Sessions receive events through bounded mpsc queues. Delivery never
//! awaits a receiver: a session whose queue is full or closed is evicted
//! from its group inside the same critical section, so one slow peer cannot
//! stall a broadcast to the rest. The registry holds no persistent state;
//! on process restart every group starts empty and clients reconnect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default bound for a session's outbound queue.
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Routing key for one broadcast domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// All sessions attached to a chat
    Chat(i64),
    /// All sessions attached to a user's notification stream
    Notifications(i64),
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Chat(chat_id) => write!(f, "chat:{chat_id}"),
            GroupKey::Notifications(user_id) => write!(f, "notifications:{user_id}"),
        }
    }
}

/// Identifies one registered session within its group. Returned by
/// [`GroupRouter::join`]; a session is registered under exactly one group
/// key at a time.
#[derive(Debug)]
pub struct SessionHandle {
    key: GroupKey,
    id: u64,
}

impl SessionHandle {
    /// The group this session is registered under
    pub fn group(&self) -> &GroupKey {
        &self.key
    }
}

/// Group router: group key → set of live session senders.
pub struct GroupRouter<E> {
    groups: Mutex<HashMap<GroupKey, HashMap<u64, mpsc::Sender<E>>>>,
    outbound_buffer: usize,
    next_session_id: AtomicU64,
}

impl<E> Default for GroupRouter<E> {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOUND_BUFFER)
    }
}

impl<E> GroupRouter<E> {
    /// Create a router whose sessions buffer at most `outbound_buffer`
    /// undelivered events each.
    pub fn new(outbound_buffer: usize) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            outbound_buffer: outbound_buffer.max(1),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Register a new session under a group key.
    ///
    /// Returns the handle to deregister with and the receiving end of the
    /// session's outbound queue. When the queue's sender disappears from the
    /// registry (leave or eviction), the receiver drains and then yields
    /// `None`, which the session task treats as its disconnect signal.
    pub async fn join(&self, key: GroupKey) -> (SessionHandle, mpsc::Receiver<E>) {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        let mut groups = self.groups.lock().await;
        groups.entry(key.clone()).or_default().insert(id, tx);

        debug!(group = %key, session = id, "session joined group");
        (SessionHandle { key, id }, rx)
    }

    /// Remove a session from its group. Idempotent: leaving twice, or after
    /// an eviction already removed the session, is a no-op.
    pub async fn leave(&self, handle: &SessionHandle) {
        let mut groups = self.groups.lock().await;
        if let Some(group) = groups.get_mut(&handle.key) {
            if group.remove(&handle.id).is_some() {
                debug!(group = %handle.key, session = handle.id, "session left group");
            }
            if group.is_empty() {
                groups.remove(&handle.key);
            }
        }
    }

    /// Number of sessions currently registered under a key
    pub async fn group_size(&self, key: &GroupKey) -> usize {
        let groups = self.groups.lock().await;
        groups.get(key).map_or(0, HashMap::len)
    }
}

impl<E: Clone> GroupRouter<E> {
    /// Deliver an event to every session registered under the key.
    ///
    /// The membership snapshot and all delivery attempts happen under one
    /// lock acquisition, so a concurrent join or leave either sees the whole
    /// broadcast or none of it. Delivery is best-effort per session: a full
    /// or closed queue evicts that session without affecting the others.
    ///
    /// Returns the number of sessions the event was handed to.
    pub async fn broadcast(&self, key: &GroupKey, event: E) -> usize {
        let mut groups = self.groups.lock().await;
        let Some(group) = groups.get_mut(key) else {
            return 0;
        };

        let mut delivered = 0;
        let mut evicted = Vec::new();

        for (id, tx) in group.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(group = %key, session = id, "outbound queue full, evicting slow session");
                    evicted.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(group = %key, session = id, "outbound queue closed, dropping session");
                    evicted.push(*id);
                }
            }
        }

        for id in evicted {
            group.remove(&id);
        }
        if group.is_empty() {
            groups.remove(key);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_member_and_nobody_else() {
        let router: GroupRouter<String> = GroupRouter::default();

        let (_h1, mut rx1) = router.join(GroupKey::Chat(7)).await;
        let (_h2, mut rx2) = router.join(GroupKey::Chat(7)).await;
        let (_h3, mut rx3) = router.join(GroupKey::Chat(8)).await;

        let delivered = router.broadcast(&GroupKey::Chat(7), "hi".to_string()).await;
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.unwrap(), "hi");
        assert_eq!(rx2.recv().await.unwrap(), "hi");
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_to_an_empty_group_delivers_nothing() {
        let router: GroupRouter<String> = GroupRouter::default();
        let delivered = router
            .broadcast(&GroupKey::Notifications(1), "lost".to_string())
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let router: GroupRouter<String> = GroupRouter::default();

        let (handle, _rx) = router.join(GroupKey::Chat(1)).await;
        let (_other, mut other_rx) = router.join(GroupKey::Chat(1)).await;

        router.leave(&handle).await;
        router.leave(&handle).await;

        assert_eq!(router.group_size(&GroupKey::Chat(1)).await, 1);

        let delivered = router.broadcast(&GroupKey::Chat(1), "still here".to_string()).await;
        assert_eq!(delivered, 1);
        assert_eq!(other_rx.recv().await.unwrap(), "still here");
    }

    #[tokio::test]
    async fn departed_sessions_receive_no_further_events() {
        let router: GroupRouter<String> = GroupRouter::default();

        let (handle, mut rx) = router.join(GroupKey::Chat(3)).await;
        router.leave(&handle).await;

        router.broadcast(&GroupKey::Chat(3), "after".to_string()).await;

        // The sender side is gone, so the queue reports disconnect
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn slow_sessions_are_evicted_without_blocking_the_rest() {
        let router: GroupRouter<u32> = GroupRouter::new(2);

        let (_slow, slow_rx) = router.join(GroupKey::Chat(5)).await;
        let (_fast, mut fast_rx) = router.join(GroupKey::Chat(5)).await;

        // The slow session never drains; its queue holds 2 events
        assert_eq!(router.broadcast(&GroupKey::Chat(5), 1).await, 2);
        assert_eq!(router.broadcast(&GroupKey::Chat(5), 2).await, 2);

        // Third broadcast overflows the slow queue and evicts that session
        assert_eq!(router.broadcast(&GroupKey::Chat(5), 3).await, 1);
        assert_eq!(router.group_size(&GroupKey::Chat(5)).await, 1);

        for expected in [1, 2, 3] {
            assert_eq!(fast_rx.recv().await.unwrap(), expected);
        }

        // The evicted session still drains what was queued, then disconnects
        let mut slow_rx = slow_rx;
        assert_eq!(slow_rx.recv().await.unwrap(), 1);
        assert_eq!(slow_rx.recv().await.unwrap(), 2);
        assert!(slow_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned_on_broadcast() {
        let router: GroupRouter<u32> = GroupRouter::default();

        let (_kept, mut kept_rx) = router.join(GroupKey::Chat(9)).await;
        let (_gone, gone_rx) = router.join(GroupKey::Chat(9)).await;
        drop(gone_rx);

        assert_eq!(router.broadcast(&GroupKey::Chat(9), 42).await, 1);
        assert_eq!(router.group_size(&GroupKey::Chat(9)).await, 1);
        assert_eq!(kept_rx.recv().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn empty_groups_are_dropped_from_the_map() {
        let router: GroupRouter<u32> = GroupRouter::default();

        let (handle, _rx) = router.join(GroupKey::Notifications(2)).await;
        assert_eq!(router.group_size(&GroupKey::Notifications(2)).await, 1);

        router.leave(&handle).await;
        assert_eq!(router.group_size(&GroupKey::Notifications(2)).await, 0);
    }

    #[tokio::test]
    async fn concurrent_joins_and_broadcasts_stay_consistent() {
        use std::sync::Arc;

        let router: Arc<GroupRouter<u64>> = Arc::new(GroupRouter::new(1024));
        let key = GroupKey::Chat(77);

        let mut joiners = Vec::new();
        for _ in 0..16 {
            let router = Arc::clone(&router);
            let key = key.clone();
            joiners.push(tokio::spawn(async move {
                let (handle, mut rx) = router.join(key.clone()).await;
                // Receive until the broadcaster side finishes
                let mut seen = 0u64;
                while let Ok(Some(_)) =
                    tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await
                {
                    seen += 1;
                }
                router.leave(&handle).await;
                seen
            }));
        }

        let broadcaster = {
            let router = Arc::clone(&router);
            let key = key.clone();
            tokio::spawn(async move {
                for n in 0..50u64 {
                    router.broadcast(&key, n).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        broadcaster.await.unwrap();
        for joiner in joiners {
            // No panic and no deadlock is the property under test
            joiner.await.unwrap();
        }

        // Everyone left; the group map is clean
        assert_eq!(router.group_size(&key).await, 0);
    }
}
