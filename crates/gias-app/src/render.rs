//! Plain-text rendering of timeline entries.

use gias_chat::{AttachmentMeta, Message, MessageKind, Sender};

/// One line per message: time, author, text, and the attached file if any.
pub fn render_message(message: &Message) -> String {
    let author = match (message.sender, message.kind) {
        (Sender::User, _) => "you",
        (Sender::Bot, MessageKind::Error) => "assistant (error)",
        (Sender::Bot, MessageKind::Progress) => "assistant (working)",
        (Sender::Bot, MessageKind::Reply) => "assistant",
    };

    let mut line = format!(
        "[{}] {}: {}",
        message.timestamp.local_time_of_day(),
        author,
        message.text
    );
    if let Some(ref attachment) = message.attachment {
        if !message.text.is_empty() {
            line.push(' ');
        }
        line.push_str(&render_attachment(attachment));
    }
    line
}

pub fn render_attachment(attachment: &AttachmentMeta) -> String {
    format!("[file: {}]", attachment.name)
}
