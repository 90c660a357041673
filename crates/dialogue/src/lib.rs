//! The guided "tell me about yourself" dialogue.
//!
//! [`apply`] is a pure function: it classifies an inbound text against a
//! closed set of commands, categories and sentinels, mutates the session in
//! place, and returns the replies to deliver.  Nothing here performs I/O.

pub mod classify;
pub mod machine;
pub mod reply;

pub use classify::{classify, Category, Classification, Command};
pub use machine::{apply, Transition};
pub use reply::{main_menu, Reply, ReplyMarkup};
