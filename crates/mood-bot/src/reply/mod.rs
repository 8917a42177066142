//! Outbound side of the conversation: the sink trait the transport
//! implements, the fixed user-facing texts and the place formatter.

pub mod format;
pub mod messages;

use async_trait::async_trait;

use crate::error::TransportError;

pub use format::{escape_html, fit_message, maps_link, render_place, MAX_MESSAGE_LEN};

/// Formatting applied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// Which reply keyboard to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardHint {
    MainMenu,
    None,
}

/// Sends messages back to the user who triggered the current event.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Reply quoting the triggering message.
    async fn reply(
        &self,
        text: &str,
        format: TextFormat,
        keyboard: KeyboardHint,
    ) -> Result<(), TransportError>;

    /// Plain message in the same chat, not quoting anything.
    async fn answer(&self, text: &str, keyboard: KeyboardHint) -> Result<(), TransportError>;
}
