//! Outbound replies and their wording.

use cb_sessions::UserSession;

use crate::classify::{Category, CUSTOM_SENTINEL, DONE_SENTINEL};

const BOT_NAME: &str = "Doctor Botter";

/// Keyboard hint attached to a reply.  Gateways without keyboards ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Show these button rows.
    Menu(Vec<Vec<String>>),
    /// Hide any keyboard currently shown.
    RemoveMenu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// The main menu: the predefined categories, the custom entry, and done.
pub fn main_menu() -> ReplyMarkup {
    let [age, colour, siblings] = Category::ALL.map(|c| c.label().to_owned());
    ReplyMarkup::Menu(vec![
        vec![age, colour],
        vec![siblings, CUSTOM_SENTINEL.to_owned()],
        vec![DONE_SENTINEL.to_owned()],
    ])
}

// ── Wording ─────────────────────────────────────────────────────────

pub(crate) fn greeting(session: &UserSession) -> Reply {
    let mut text = format!("Hi! My name is {BOT_NAME}.");
    if session.facts.is_empty() {
        text.push_str(
            " I will hold a more complex conversation with you. \
             Why don't you tell me something about yourself?",
        );
    } else {
        text.push_str(&format!(
            " You already told me your {}. Why don't you tell me something more \
             about yourself? Or change anything I already know.",
            session.known_categories()
        ));
    }
    Reply::text(text).with_markup(main_menu())
}

pub(crate) fn invite(category: &str) -> Reply {
    Reply::text(format!("Your {category}? Yes, I would love to hear about that!"))
}

pub(crate) fn already_known(category: &str, value: &str) -> Reply {
    Reply::text(format!(
        "Your {category}? I already know the following about that: {value}"
    ))
}

pub(crate) fn ask_custom_category() -> Reply {
    Reply::text("Alright, please send me the category first, for example \"Most impressive skill\"")
}

pub(crate) fn received(session: &UserSession) -> Reply {
    Reply::text(format!(
        "Neat! Just so you know, this is what you already told me:\n{}\n\
         You can tell me more, or change your opinion on something.",
        session.facts_listing()
    ))
    .with_markup(main_menu())
}

pub(crate) fn done(session: &UserSession) -> Reply {
    Reply::text(format!(
        "I learned these facts about you:\n{}\nUntil next time!",
        session.facts_listing()
    ))
    .with_markup(ReplyMarkup::RemoveMenu)
}

pub(crate) fn show(session: &UserSession) -> Reply {
    if session.facts.is_empty() {
        Reply::text("You haven't told me anything about yourself yet.")
    } else {
        Reply::text(session.facts_listing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_menu_layout() {
        let ReplyMarkup::Menu(rows) = main_menu() else {
            panic!("main menu must be a menu");
        };
        assert_eq!(
            rows,
            vec![
                vec!["Age".to_string(), "Favourite colour".to_string()],
                vec!["Number of siblings".to_string(), "Something else...".to_string()],
                vec!["Done".to_string()],
            ]
        );
    }

    #[test]
    fn greeting_without_facts_has_no_recap() {
        let reply = greeting(&UserSession::new());
        assert!(reply.text.starts_with("Hi! My name is Doctor Botter."));
        assert!(!reply.text.contains("already told me"));
        assert_eq!(reply.markup, Some(main_menu()));
    }

    #[test]
    fn greeting_lists_known_categories() {
        let mut session = UserSession::new();
        session.facts.insert("age".into(), "17".into());
        session.facts.insert("favourite colour".into(), "red".into());
        let reply = greeting(&session);
        assert!(reply.text.contains("You already told me your age, favourite colour."));
    }

    #[test]
    fn done_hides_the_menu() {
        let mut session = UserSession::new();
        session.facts.insert("age".into(), "17".into());
        let reply = done(&session);
        assert_eq!(reply.markup, Some(ReplyMarkup::RemoveMenu));
        assert!(reply.text.contains("age - 17"));
    }
}
