//! Snapshot file I/O.
//!
//! The snapshot is a single JSON object mapping actor IDs to session records.
//! It is always rewritten in full; with atomic writes enabled the new content
//! goes to `<file>.tmp` first and is renamed over the old snapshot, so a
//! crash mid-write leaves the previous snapshot intact.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use cb_domain::error::{Error, Result};

use crate::session::{ActorId, UserSession};

/// Snapshot contents, ordered by actor so output is stable.
pub type Snapshot = BTreeMap<ActorId, UserSession>;

/// Outcome of reading a snapshot file.
#[derive(Debug)]
pub enum ReadOutcome {
    Loaded(Snapshot),
    /// No file at the path.
    Missing,
    /// File exists but holds nothing but whitespace.
    Empty,
}

/// Read and decode the snapshot at `path`.
///
/// Missing and empty files are reported as such; unreadable or undecodable
/// files are errors.
pub fn read(path: &Path) -> Result<ReadOutcome> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ReadOutcome::Missing),
        Err(e) => return Err(Error::Io(e)),
    };

    if raw.trim().is_empty() {
        return Ok(ReadOutcome::Empty);
    }

    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    Ok(ReadOutcome::Loaded(snapshot))
}

/// Encode a snapshot as pretty-printed JSON.
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(snapshot)?)
}

/// Write `bytes` to `path`, creating the parent directory if needed.
pub fn write(path: &Path, bytes: &[u8], atomic: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if !atomic {
        std::fs::write(path, bytes)?;
        return Ok(());
    }

    let tmp = tmp_path(path);
    let result = write_synced(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// `sessions.json` → `sessions.json.tmp`, next to the target.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = read(&dir.path().join("nope.json")).unwrap();
        assert!(matches!(outcome, ReadOutcome::Missing));
    }

    #[test]
    fn whitespace_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(matches!(read(&path).unwrap(), ReadOutcome::Empty));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read(&path), Err(Error::Json(_))));
    }

    #[test]
    fn encode_uses_string_actor_keys_and_state_codes() {
        use crate::session::DialogueState;

        let mut snapshot = Snapshot::new();
        let mut session = UserSession::new();
        session.state = DialogueState::TypingCategory;
        snapshot.insert(ActorId(-42), session);

        let bytes = encode(&snapshot).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["-42"]["state"], 2);
        assert!(json["-42"].get("pending_category").is_none());
    }

    #[test]
    fn atomic_write_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.json");
        write(&path, b"{}", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn direct_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        write(&path, b"{\"old\":true}", false).unwrap();
        write(&path, b"{}", false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/conversationbot.json")),
            Path::new("/data/conversationbot.json.tmp")
        );
    }
}
