//! Event dispatch loop.
//!
//! For every inbound event: resolve the actor's session, run the dialogue,
//! deliver the replies in order, then persist the whole store.  Persisting
//! happens after every event, whether or not anything changed.

use std::path::PathBuf;
use std::sync::Arc;

use cb_dialogue::Transition;
use cb_domain::trace::TraceEvent;
use cb_sessions::SessionStore;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::actor_lock::ActorLocks;
use crate::channel::{InboundEvent, ReplySender};

/// Drives the dialogue for every actor.  Cheap to clone; clones share the
/// store, sender and locks.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<SessionStore>,
    sender: Arc<dyn ReplySender>,
    snapshot_path: PathBuf,
    actor_locks: Arc<ActorLocks>,
    in_flight: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SessionStore>,
        sender: Arc<dyn ReplySender>,
        snapshot_path: PathBuf,
        max_in_flight: usize,
    ) -> Self {
        Self {
            store,
            sender,
            snapshot_path,
            actor_locks: Arc::new(ActorLocks::new()),
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Process events until the gateway closes its end of the channel, then
    /// wait for in-flight events and write a final snapshot.
    ///
    /// The actor lock is taken here, in arrival order, before the event is
    /// handed to a worker; a busy actor holds back the loop rather than
    /// letting its events overtake each other.
    pub async fn run(&self, mut events: mpsc::Receiver<InboundEvent>) {
        let mut workers = JoinSet::new();

        while let Some(event) = events.recv().await {
            if !is_dispatchable(&event) {
                tracing::debug!(actor = %event.actor, "ignoring empty message");
                continue;
            }

            let Ok(slot) = self.in_flight.clone().acquire_owned().await else {
                break;
            };
            let turn = self.actor_locks.enter(event.actor).await;

            let this = self.clone();
            workers.spawn(async move {
                let _slot = slot;
                let _turn = turn;
                this.handle(event).await;
            });

            while let Some(done) = workers.try_join_next() {
                if let Err(e) = done {
                    tracing::error!(error = %e, "dispatch worker panicked");
                }
            }
            self.actor_locks.prune_idle();
        }

        tracing::info!("inbound stream closed, draining in-flight events");
        while let Some(done) = workers.join_next().await {
            if let Err(e) = done {
                tracing::error!(error = %e, "dispatch worker panicked");
            }
        }

        self.flush().await;
        tracing::info!(sessions = self.store.len(), "dispatcher stopped");
    }

    /// Apply one event end to end.  Callers running events concurrently
    /// must hold the actor's lock (see [`run`](Self::run)).
    ///
    /// Returns `None` for events that carry no text.
    pub async fn handle(&self, event: InboundEvent) -> Option<Transition> {
        if !is_dispatchable(&event) {
            return None;
        }

        let (handle, is_new) = self.store.resolve_or_create(event.actor);
        if is_new {
            tracing::info!(
                actor = %event.actor,
                sender = event.sender.as_deref().unwrap_or("-"),
                "new session created"
            );
        }

        let transition = {
            let mut session = handle.lock();
            let transition = cb_dialogue::apply(&mut session, &event.text, event.is_command);
            if transition.from != transition.to || !transition.replies.is_empty() {
                session.touch(chrono::Utc::now().timestamp());
            }
            transition
        };

        tracing::debug!(
            actor = %event.actor,
            from = %transition.from,
            to = %transition.to,
            classification = transition.classification.as_str(),
            "transition applied"
        );
        TraceEvent::TransitionApplied {
            actor: event.actor.to_string(),
            from: transition.from.to_string(),
            to: transition.to.to_string(),
            classification: transition.classification.as_str().to_owned(),
            replies: transition.replies.len(),
        }
        .emit();

        for reply in &transition.replies {
            if let Err(e) = self.sender.send(event.chat, reply).await {
                tracing::warn!(
                    gateway = self.sender.name(),
                    actor = %event.actor,
                    chat = %event.chat,
                    from_state = %transition.from,
                    error = %e,
                    "reply not delivered"
                );
                TraceEvent::ReplyDropped {
                    actor: event.actor.to_string(),
                    chat: event.chat.to_string(),
                    from_state: transition.from.to_string(),
                    reason: e.to_string(),
                }
                .emit();
            }
        }

        self.flush().await;
        Some(transition)
    }

    /// Write the store to the snapshot file.  Failures are logged; the next
    /// flush writes the full in-memory state again.
    pub async fn flush(&self) {
        let store = self.store.clone();
        let path = self.snapshot_path.clone();
        let result = tokio::task::spawn_blocking(move || store.persist(&path)).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(
                path = %self.snapshot_path.display(),
                error = %e,
                "session snapshot write failed"
            ),
            Err(e) => tracing::warn!(error = %e, "session snapshot task failed"),
        }
    }
}

/// Events without text (stickers, photos, whitespace) are never dispatched.
fn is_dispatchable(event: &InboundEvent) -> bool {
    !event.text.trim().is_empty()
}
