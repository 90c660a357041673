//! Inbound text classification.
//!
//! Everything the dialogue recognises is listed here as data.  Matching is
//! exact after trimming and ASCII case folding.

/// Menu entry that asks for a user-named category.
pub const CUSTOM_SENTINEL: &str = "Something else...";
/// Menu entry that ends the current round.
pub const DONE_SENTINEL: &str = "Done";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Categories & commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Predefined fact categories offered on the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Age,
    FavouriteColour,
    NumberOfSiblings,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Age,
        Category::FavouriteColour,
        Category::NumberOfSiblings,
    ];

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::FavouriteColour => "Favourite colour",
            Self::NumberOfSiblings => "Number of siblings",
        }
    }

    /// Key under which the fact is stored.
    pub fn key(&self) -> String {
        self.label().to_lowercase()
    }

    fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(text))
    }
}

/// Bot commands.  The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Show,
}

impl Command {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "show" | "show_data" => Some(Self::Show),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Command(Command),
    /// A command outside the closed set; carries the command name.
    UnknownCommand(String),
    Regular(Category),
    Custom,
    Done,
    /// Free text matching nothing above.
    Other,
    /// Empty or whitespace-only text.
    Blank,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command(Command::Start) => "start",
            Self::Command(Command::Show) => "show",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Regular(_) => "regular",
            Self::Custom => "custom",
            Self::Done => "done",
            Self::Other => "other",
            Self::Blank => "blank",
        }
    }
}

/// Classify an inbound text.  `is_command` is the gateway's verdict that
/// the text is a bot command (e.g. `/start@my_bot now`).
pub fn classify(text: &str, is_command: bool) -> Classification {
    let text = text.trim();

    if text.is_empty() {
        return Classification::Blank;
    }

    if is_command {
        let name = command_name(text);
        return match Command::parse(name) {
            Some(cmd) => Classification::Command(cmd),
            None => Classification::UnknownCommand(name.to_owned()),
        };
    }

    if text.eq_ignore_ascii_case(DONE_SENTINEL) {
        Classification::Done
    } else if let Some(category) = Category::parse(text) {
        Classification::Regular(category)
    } else if text.eq_ignore_ascii_case(CUSTOM_SENTINEL) {
        Classification::Custom
    } else {
        Classification::Other
    }
}

/// `/start@my_bot arg` → `start`.
fn command_name(text: &str) -> &str {
    let first = text.split_whitespace().next().unwrap_or("");
    let first = first.strip_prefix('/').unwrap_or(first);
    first.split('@').next().unwrap_or(first)
}
