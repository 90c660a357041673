//! State × classification transition table.

use cb_sessions::{DialogueState, UserSession};

use crate::classify::{classify, Classification, Command};
use crate::reply::{self, Reply};

/// Result of applying one inbound text to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: DialogueState,
    pub to: DialogueState,
    pub classification: Classification,
    /// Replies to deliver, in order.  Empty when the text was ignored.
    pub replies: Vec<Reply>,
}

/// Classify `text` and advance `session` accordingly.
///
/// `start`, `show`, and `Done` behave the same in every state.  Blank text
/// and unknown commands are ignored everywhere.  While typing a reply, any other text
/// (even a menu label) is taken as the value.
pub fn apply(session: &mut UserSession, text: &str, is_command: bool) -> Transition {
    use Classification as C;
    use DialogueState as S;

    let classification = classify(text, is_command);
    let from = session.state;

    let replies = match (from, &classification) {
        (_, C::Command(Command::Start)) => start(session),
        (_, C::Command(Command::Show)) => vec![reply::show(session)],
        (_, C::UnknownCommand(_) | C::Blank) => Vec::new(),
        (_, C::Done) => done(session),

        (S::Choosing | S::TypingCategory, C::Regular(category)) => {
            select_category(session, category.key(), true)
        }
        (S::Choosing | S::TypingCategory, C::Custom) => ask_custom(session),
        (S::Choosing, C::Other) => Vec::new(),
        (S::TypingCategory, C::Other) => {
            select_category(session, text.trim().to_lowercase(), false)
        }

        (S::TypingReply, C::Regular(_) | C::Custom | C::Other) => record(session, text),
    };

    Transition {
        from,
        to: session.state,
        classification,
        replies,
    }
}

fn start(session: &mut UserSession) -> Vec<Reply> {
    session.pending_category = None;
    session.state = DialogueState::Choosing;
    vec![reply::greeting(session)]
}

fn done(session: &mut UserSession) -> Vec<Reply> {
    session.pending_category = None;
    session.state = DialogueState::Choosing;
    vec![reply::done(session)]
}

fn ask_custom(session: &mut UserSession) -> Vec<Reply> {
    session.pending_category = None;
    session.state = DialogueState::TypingCategory;
    vec![reply::ask_custom_category()]
}

/// Start eliciting `category`.  Predefined categories quote a value that is
/// already on record; custom ones always just invite input.
fn select_category(session: &mut UserSession, category: String, quote_known: bool) -> Vec<Reply> {
    let reply = match session.facts.get(&category) {
        Some(value) if quote_known => reply::already_known(&category, value),
        _ => reply::invite(&category),
    };
    session.pending_category = Some(category);
    session.state = DialogueState::TypingReply;
    vec![reply]
}

fn record(session: &mut UserSession, text: &str) -> Vec<Reply> {
    session.state = DialogueState::Choosing;

    // A typing-reply session without a category only comes from a hand-edited
    // snapshot; drop back to the menu without recording anything.
    let Some(category) = session.pending_category.take() else {
        return Vec::new();
    };

    session.facts.insert(category, text.trim().to_lowercase());
    vec![reply::received(session)]
}
