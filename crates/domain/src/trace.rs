use serde::Serialize;

/// Structured trace events emitted across all conversationbot crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SnapshotLoaded {
        path: String,
        sessions: usize,
    },
    SnapshotPersisted {
        path: String,
        sessions: usize,
        bytes: usize,
    },
    SessionCreated {
        actor: String,
    },
    TransitionApplied {
        actor: String,
        from: String,
        to: String,
        classification: String,
        replies: usize,
    },
    ReplyDropped {
        actor: String,
        chat: String,
        from_state: String,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cb_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::SessionCreated {
            actor: "42".into(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "SessionCreated");
        assert_eq!(json["actor"], "42");
    }
}
