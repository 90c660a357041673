//! Per-actor turn queue.
//!
//! The dispatch loop calls [`ActorLocks::enter`] in arrival order and hands
//! the returned [`ActorTurn`] to the worker that processes the event.  A
//! second event from the same actor queues behind the first until its turn
//! is dropped; events from different actors run side by side.

use std::collections::HashMap;
use std::sync::Arc;

use cb_sessions::ActorId;
use parking_lot::Mutex;
use tokio::sync::{Mutex as TurnMutex, OwnedMutexGuard};

/// Exclusive right to process one event for one actor.  Released on drop.
pub type ActorTurn = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct ActorLocks {
    queues: Mutex<HashMap<ActorId, Arc<TurnMutex<()>>>>,
}

impl ActorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for `actor`'s turn.  The tokio mutex is fair, so callers for the
    /// same actor are served in the order they called `enter`.
    pub async fn enter(&self, actor: ActorId) -> ActorTurn {
        let queue = self.queues.lock().entry(actor).or_default().clone();
        queue.lock_owned().await
    }

    /// Drop queues that no turn holds or waits on.  The map is the only
    /// owner of such a queue.
    pub fn prune_idle(&self) {
        self.queues.lock().retain(|_, queue| Arc::strong_count(queue) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_actor_is_served_in_arrival_order() {
        let locks = Arc::new(ActorLocks::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = locks.enter(ActorId(7)).await;
        let mut waiters = Vec::new();
        for n in 1..=3 {
            let locks = locks.clone();
            let order = order.clone();
            waiters.push(tokio::spawn(async move {
                let _turn = locks.enter(ActorId(7)).await;
                order.lock().push(n);
            }));
            // Let each waiter queue up before spawning the next.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(order.lock().is_empty());
        drop(first);
        for w in waiters {
            w.await.unwrap();
        }
        assert_eq!(*order.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn other_actors_are_not_blocked() {
        let locks = ActorLocks::new();
        let _held = locks.enter(ActorId(1)).await;

        let other = tokio::time::timeout(Duration::from_millis(100), locks.enter(ActorId(2))).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn prune_forgets_only_idle_actors() {
        let locks = ActorLocks::new();
        let held = locks.enter(ActorId(1)).await;
        drop(locks.enter(ActorId(2)).await);

        locks.prune_idle();
        assert_eq!(locks.queues.lock().len(), 1);
        assert!(locks.queues.lock().contains_key(&ActorId(1)));

        drop(held);
        locks.prune_idle();
        assert!(locks.queues.lock().is_empty());
    }
}
