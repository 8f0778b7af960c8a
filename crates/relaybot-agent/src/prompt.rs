//! Flattens a channel's history plus the incoming message into one text prompt.
//!
//! ```text
//! User: <content>
//!
//! Assistant: <content>
//!
//! User: <new message>
//! ```

use crate::turn::{Role, Turn};

const TURN_SEPARATOR: &str = "\n\n";

/// Render `history` followed by `new_text` as the user's next turn.
///
/// `history` must not already contain `new_text`; the caller passes the
/// window as it was before the new message was recorded.
pub fn build_prompt(history: &[Turn], new_text: &str) -> String {
    history
        .iter()
        .map(|turn| render_turn(turn.role, &turn.content))
        .chain(std::iter::once(render_turn(Role::User, new_text)))
        .collect::<Vec<_>>()
        .join(TURN_SEPARATOR)
}

fn render_turn(role: Role, content: &str) -> String {
    format!("{}: {}", role.label(), content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_history_then_new_message() {
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        assert_eq!(
            build_prompt(&history, "how are you"),
            "User: hi\n\nAssistant: hello\n\nUser: how are you"
        );
    }

    #[test]
    fn empty_history_is_just_the_message() {
        assert_eq!(build_prompt(&[], "ping"), "User: ping");
    }

    #[test]
    fn content_is_passed_through_verbatim() {
        let long = "x".repeat(10_000);
        let prompt = build_prompt(&[Turn::user("line1\nline2")], &long);
        assert!(prompt.starts_with("User: line1\nline2\n\nUser: "));
        assert!(prompt.ends_with(&long));
    }
}
