use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session snapshot storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON snapshot holding every session.  Rewritten after each event.
    #[serde(default = "d_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Used instead of `snapshot_path` when its directory cannot be created
    /// (e.g. running outside the container without the `/data` volume).
    #[serde(default = "d_fallback_path")]
    pub fallback_path: PathBuf,

    /// Write to `<snapshot>.tmp` and rename over the snapshot.
    #[serde(default = "d_true")]
    pub atomic_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: d_snapshot_path(),
            fallback_path: d_fallback_path(),
            atomic_writes: true,
        }
    }
}

fn d_snapshot_path() -> PathBuf {
    PathBuf::from("/data/conversationbot.json")
}
fn d_fallback_path() -> PathBuf {
    PathBuf::from("conversationbot.json")
}
fn d_true() -> bool {
    true
}
