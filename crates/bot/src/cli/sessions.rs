//! `conversationbot sessions list`.

use cb_domain::config::StorageConfig;
use cb_sessions::snapshot::{self, ReadOutcome, Snapshot};

use crate::bootstrap;

pub fn list(cfg: &StorageConfig, json: bool) -> anyhow::Result<()> {
    let path = bootstrap::resolve_snapshot_path(cfg);
    let sessions = match snapshot::read(&path)? {
        ReadOutcome::Loaded(sessions) => sessions,
        ReadOutcome::Missing | ReadOutcome::Empty => Snapshot::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No sessions in {}", path.display());
        return Ok(());
    }
    print!("{}", render_table(&sessions));
    println!("\n{} session(s) in {}", sessions.len(), path.display());
    Ok(())
}

fn render_table(sessions: &Snapshot) -> String {
    let mut out = format!("{:<14} {:<16} {:<20} {:>5}  {}\n", "ACTOR", "STATE", "PENDING", "FACTS", "UPDATED");
    for (actor, session) in sessions {
        let updated = chrono::DateTime::from_timestamp(session.last_updated, 0)
            .filter(|_| session.last_updated > 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{:<14} {:<16} {:<20} {:>5}  {}\n",
            actor.to_string(),
            session.state.as_str(),
            session.pending_category.as_deref().unwrap_or("-"),
            session.facts.len(),
            updated,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_sessions::{ActorId, DialogueState, UserSession};

    #[test]
    fn table_lists_one_row_per_actor() {
        let mut sessions = Snapshot::new();
        let mut typing = UserSession::new();
        typing.state = DialogueState::TypingReply;
        typing.pending_category = Some("age".into());
        typing.facts.insert("color".into(), "blue".into());
        sessions.insert(ActorId(7), typing);
        sessions.insert(ActorId(3), UserSession::new());

        let table = render_table(&sessions);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("3 "));
        assert!(lines[2].contains("typing_reply"));
        assert!(lines[2].contains("age"));
    }
}
