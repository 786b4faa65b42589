//! Message formatting utilities for client display.

use traveller_server::infrastructure::dto::websocket::OutboundFrame;
use traveller_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one text message from the hub.
    ///
    /// The hub may coalesce several frames into one message separated by
    /// `\n`; each frame is formatted on its own.
    pub fn format_text(text: &str, current_user: &str) -> String {
        text.split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| match OutboundFrame::from_json(line) {
                Ok(frame) => Self::format_frame(&frame, current_user),
                Err(_) => Self::format_raw_message(line),
            })
            .collect()
    }

    pub fn format_frame(frame: &OutboundFrame, current_user: &str) -> String {
        match frame {
            OutboundFrame::Broadcast {
                content, from_user, ..
            } => Self::format_broadcast(from_user, content, current_user),
            OutboundFrame::Private {
                message, from_user, ..
            } => Self::format_private(from_user, message),
        }
    }

    /// Format a broadcast, marking the current user's own messages
    pub fn format_broadcast(from: &str, content: &str, current_user: &str) -> String {
        let me_suffix = if from == current_user { " (me)" } else { "" };
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}{}: {}\n\
             ------------------------------------------------------------\n",
            from, me_suffix, content
        )
    }

    /// Format a private message addressed to the current user
    pub fn format_private(from: &str, message: &str) -> String {
        format!("\n[private] @{}: {}\n", from, message)
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `sent_at` - Unix timestamp when the message was sent (milliseconds)
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        format!("sent at {}\n", timestamp_to_rfc3339(sent_at))
    }

    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
