//! Process-wide session store.
//!
//! Membership of the actor → session map is guarded by a `RwLock`: lookups
//! share it, inserts and snapshot reads exclude inserts.  Each session record
//! sits behind its own `Mutex`, which callers hold for every mutation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use cb_domain::error::Result;
use cb_domain::trace::TraceEvent;

use crate::session::{ActorId, UserSession};
use crate::snapshot::{self, ReadOutcome, Snapshot};

/// Shared, individually locked session record.
pub type SessionHandle = Arc<Mutex<UserSession>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owns every session for the lifetime of the process.  Sessions are never
/// evicted.
pub struct SessionStore {
    sessions: RwLock<HashMap<ActorId, SessionHandle>>,
    /// Serializes snapshot writes so an older snapshot never lands after a
    /// newer one.
    writer: Mutex<()>,
    atomic_writes: bool,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// An empty store using atomic snapshot writes.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
            atomic_writes: true,
        }
    }

    /// Choose between write-temp-then-rename (`true`) and direct overwrite.
    pub fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic_writes = atomic;
        self
    }

    /// Create a store and populate it from the snapshot at `path`.
    pub fn open(path: &Path, atomic_writes: bool) -> Self {
        let store = Self::new().with_atomic_writes(atomic_writes);
        store.load(path);
        store
    }

    /// Replace the in-memory sessions with the snapshot at `path`.
    ///
    /// Never fails: a missing file yields an empty store, and an unreadable
    /// or corrupt file is logged and also yields an empty store.  Returns the
    /// number of sessions loaded.
    pub fn load(&self, path: &Path) -> usize {
        let loaded = match snapshot::read(path) {
            Ok(ReadOutcome::Loaded(snapshot)) => snapshot,
            Ok(ReadOutcome::Missing) => {
                tracing::info!(path = %path.display(), "no session snapshot found, starting fresh");
                Snapshot::new()
            }
            Ok(ReadOutcome::Empty) => {
                tracing::info!(path = %path.display(), "session snapshot is empty");
                Snapshot::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "session snapshot unreadable, starting with an empty store"
                );
                Snapshot::new()
            }
        };

        let count = loaded.len();
        let map = loaded
            .into_iter()
            .map(|(actor, session)| (actor, Arc::new(Mutex::new(session))))
            .collect();
        *self.sessions.write() = map;

        TraceEvent::SnapshotLoaded {
            path: path.display().to_string(),
            sessions: count,
        }
        .emit();

        count
    }

    /// Look up a session without creating it.
    pub fn get(&self, actor: ActorId) -> Option<SessionHandle> {
        self.sessions.read().get(&actor).cloned()
    }

    /// Return the actor's session, creating a fresh one on first contact.
    pub fn get_or_create(&self, actor: ActorId) -> SessionHandle {
        self.resolve_or_create(actor).0
    }

    /// Like [`get_or_create`](Self::get_or_create), also reporting whether
    /// this call created the session.  Exactly one concurrent caller sees
    /// `true` for a new actor.
    pub fn resolve_or_create(&self, actor: ActorId) -> (SessionHandle, bool) {
        // Fast path: session already exists.
        if let Some(handle) = self.get(actor) {
            return (handle, false);
        }

        // Slow path: re-check under the exclusive lock.
        let mut sessions = self.sessions.write();
        let mut created = false;
        let handle = sessions
            .entry(actor)
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(UserSession::new()))
            })
            .clone();
        drop(sessions);

        if created {
            TraceEvent::SessionCreated {
                actor: actor.to_string(),
            }
            .emit();
        }

        (handle, created)
    }

    /// Number of known actors.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Known actors in ascending order.
    pub fn actors(&self) -> Vec<ActorId> {
        let mut actors: Vec<ActorId> = self.sessions.read().keys().copied().collect();
        actors.sort();
        actors
    }

    /// Owned copy of every session record, taken under the shared lock.
    pub fn snapshot(&self) -> Snapshot {
        let sessions = self.sessions.read();
        sessions
            .iter()
            .map(|(actor, handle)| (*actor, handle.lock().clone()))
            .collect()
    }

    /// Serialize every session and overwrite the snapshot at `path`.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let _writer = self.writer.lock();

        let snapshot = self.snapshot();
        let bytes = snapshot::encode(&snapshot)?;
        snapshot::write(path, &bytes, self.atomic_writes)?;

        TraceEvent::SnapshotPersisted {
            path: path.display().to_string(),
            sessions: snapshot.len(),
            bytes: bytes.len(),
        }
        .emit();

        Ok(())
    }
}
