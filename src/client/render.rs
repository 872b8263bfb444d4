use crate::client::ChatState;
use crate::models::chat::{ ChatMessage, Role };

pub const EMPTY_PLACEHOLDER: &str = "Start a conversation";
pub const LOADING_INDICATOR: &str = "bot> ...";

const USER_PREFIX: &str = "you> ";
const ASSISTANT_PREFIX: &str = "bot> ";
const CONTINUATION: &str = "     ";

/// Renders one message; continuation lines are indented under the prefix.
pub fn render_message(message: &ChatMessage) -> String {
    let prefix = match message.role() {
        Role::User => USER_PREFIX,
        Role::Assistant => ASSISTANT_PREFIX,
    };

    let mut out = String::new();
    for (i, line) in message.content().lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(if i == 0 { prefix } else { CONTINUATION });
        out.push_str(line);
    }
    if out.is_empty() {
        out.push_str(prefix.trim_end());
    }
    out
}

/// Whole transcript, with the loading indicator after the last message while awaiting.
pub fn render(messages: &[ChatMessage], state: ChatState) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(messages.len() + 1);

    if messages.is_empty() && state == ChatState::Idle {
        lines.push(EMPTY_PLACEHOLDER.to_string());
    }
    lines.extend(messages.iter().map(render_message));
    if state == ChatState::AwaitingResponse {
        lines.push(LOADING_INDICATOR.to_string());
    }

    lines.join("\n")
}
