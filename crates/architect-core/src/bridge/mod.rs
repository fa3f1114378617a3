//! Host side of the chat webview
//!
//! Decodes webview messages, routes them to the chat session or the command
//! runner, and encodes the replies.

pub mod handler;
pub mod protocol;

pub use handler::{CommandRunner, MessageHandler};
pub use protocol::{InboundMessage, OutboundMessage};
