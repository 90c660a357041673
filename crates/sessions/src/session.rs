//! Per-actor session record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Actor identity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stable identifier of a remote user (the Telegram user ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub i64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for ActorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dialogue state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where an actor currently is in the guided dialogue.
///
/// Persisted as an integer: `0` choosing, `1` typing a reply, `2` typing a
/// custom category name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DialogueState {
    /// Waiting for a menu choice.
    #[default]
    Choosing,
    /// Waiting for the value of `pending_category`.
    TypingReply,
    /// Waiting for the name of a custom category.
    TypingCategory,
}

impl DialogueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Choosing => "choosing",
            Self::TypingReply => "typing_reply",
            Self::TypingCategory => "typing_category",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DialogueState> for u8 {
    fn from(state: DialogueState) -> Self {
        match state {
            DialogueState::Choosing => 0,
            DialogueState::TypingReply => 1,
            DialogueState::TypingCategory => 2,
        }
    }
}

impl TryFrom<u8> for DialogueState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Choosing),
            1 => Ok(Self::TypingReply),
            2 => Ok(Self::TypingCategory),
            other => Err(format!("unknown dialogue state code {other}")),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Dialogue position and collected facts for one actor.
///
/// `current_key` and `user_data` are accepted on read so snapshots written
/// by earlier deployments still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default)]
    pub state: DialogueState,
    /// Category currently being elicited.  Only set mid-elicitation.
    #[serde(
        default,
        alias = "current_key",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub pending_category: Option<String>,
    /// Lower-cased category → lower-cased value.
    #[serde(default, alias = "user_data", deserialize_with = "null_as_empty")]
    pub facts: BTreeMap<String, String>,
    /// Unix seconds of the last mutation.  Advisory only.
    #[serde(default)]
    pub last_updated: i64,
}

impl UserSession {
    /// A fresh session: choosing, nothing known yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time of the latest mutation.
    pub fn touch(&mut self, unix_secs: i64) {
        self.last_updated = unix_secs;
    }

    /// Every fact as `"<category> - <value>"`, one per line, sorted by
    /// category.
    pub fn facts_listing(&self) -> String {
        self.facts
            .iter()
            .map(|(category, value)| format!("{category} - {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Known category names, comma separated.
    pub fn known_categories(&self) -> String {
        self.facts.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
