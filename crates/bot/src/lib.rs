pub mod actor_lock;
pub mod bootstrap;
pub mod channel;
pub mod cli;
pub mod dispatcher;
