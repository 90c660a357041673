//! Session management for conversationbot.
//!
//! One [`UserSession`] per actor, owned by a [`SessionStore`] that guards
//! membership with a shared/exclusive lock and hands out individually locked
//! session handles.  The whole store round-trips through a single JSON
//! snapshot file.

pub mod session;
pub mod snapshot;
pub mod store;

pub use session::{ActorId, DialogueState, UserSession};
pub use store::{SessionHandle, SessionStore};
