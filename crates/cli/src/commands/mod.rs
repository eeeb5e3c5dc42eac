//! Command handlers for the Newsdesk CLI.

pub mod ask;
pub mod ping;

pub use ask::AskCommand;
pub use ping::PingCommand;
