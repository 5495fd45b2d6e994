//! Conversation state management.
//!
//! Wraps the core `Conversation` with the windowing policy: either the
//! full history or a bounded sliding window of the most recent turns.
//! The active mode is a per-deployment configuration choice, not hidden
//! logic inside the controller.

use newsdesk_core::{Conversation, Turn};
use serde::{Deserialize, Serialize};

/// How much history is folded into each prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "turns")]
pub enum HistoryWindow {
    /// Full history, however long the session runs.
    Unbounded,
    /// At most this many user+assistant pairs (2x entries).
    Bounded(usize),
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Bounded(10)
    }
}

/// Ordered turn history plus the windowing policy.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    conversation: Conversation,
    window: HistoryWindow,
}

impl ConversationHistory {
    pub fn new(window: HistoryWindow) -> Self {
        Self {
            conversation: Conversation::new(),
            window,
        }
    }

    /// Append a turn. Turns are immutable and never reordered.
    pub fn append(&mut self, turn: Turn) {
        self.conversation.push(turn);
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.conversation.turns
    }

    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }

    /// The trailing slice of turns selected by the window policy:
    /// everything for `Unbounded`, at most `2 * max_turns` entries for
    /// `Bounded(max_turns)`. Insertion order is preserved.
    pub fn window(&self) -> &[Turn] {
        let turns = &self.conversation.turns;
        match self.window {
            HistoryWindow::Unbounded => turns,
            HistoryWindow::Bounded(max_turns) => {
                let cap = max_turns.saturating_mul(2);
                let start = turns.len().saturating_sub(cap);
                &turns[start..]
            }
        }
    }

    /// The windowed history rendered for prompt inclusion.
    pub fn rendered_window(&self) -> String {
        render_turns(self.window())
    }

    /// The most recent user turns inside the window, oldest first.
    /// Used for history-augmented retrieval query reformulation.
    pub fn windowed_user_contents(&self) -> Vec<&str> {
        self.window()
            .iter()
            .filter(|t| t.role == newsdesk_core::Role::User)
            .map(|t| t.content.as_str())
            .collect()
    }
}

/// Render turns as `"User: ...\nAssistant: ...\n"` text, preserving
/// order. Pure: identical input always yields identical output. Any role
/// ordering renders correctly — alternation is not asserted.
pub fn render_turns(turns: &[Turn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(turn.role.label());
        out.push_str(": ");
        out.push_str(&turn.content);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(history: &mut ConversationHistory, pairs: usize) {
        for i in 0..pairs {
            history.append(Turn::user(format!("question {i}")));
            history.append(Turn::assistant(format!("answer {i}")));
        }
    }

    #[test]
    fn bounded_window_caps_at_twice_max_turns() {
        let mut history = ConversationHistory::new(HistoryWindow::Bounded(3));
        filled(&mut history, 10);

        let window = history.window();
        assert_eq!(window.len(), 6);
        // trailing pairs, original order
        assert_eq!(window[0].content, "question 7");
        assert_eq!(window[5].content, "answer 9");
    }

    #[test]
    fn bounded_window_returns_everything_when_short() {
        let mut history = ConversationHistory::new(HistoryWindow::Bounded(5));
        filled(&mut history, 2);
        assert_eq!(history.window().len(), 4);
    }

    #[test]
    fn unbounded_window_returns_full_history() {
        let mut history = ConversationHistory::new(HistoryWindow::Unbounded);
        filled(&mut history, 25);
        assert_eq!(history.window().len(), 50);
    }

    #[test]
    fn render_produces_labelled_lines_in_order() {
        let turns = vec![
            Turn::user("What is Rust?"),
            Turn::assistant("A systems language."),
        ];
        let text = render_turns(&turns);
        assert_eq!(text, "User: What is Rust?\nAssistant: A systems language.\n");
    }

    #[test]
    fn render_tolerates_non_alternating_roles() {
        let turns = vec![
            Turn::user("first"),
            Turn::user("second"),
            Turn::assistant("reply"),
        ];
        let text = render_turns(&turns);
        assert_eq!(text, "User: first\nUser: second\nAssistant: reply\n");
    }

    #[test]
    fn render_window_is_idempotent_for_fixed_input() {
        let mut history = ConversationHistory::new(HistoryWindow::Bounded(2));
        filled(&mut history, 4);

        let first = history.rendered_window();
        let second = history.rendered_window();
        assert_eq!(first, second);
    }

    #[test]
    fn windowed_user_contents_filters_to_user_turns() {
        let mut history = ConversationHistory::new(HistoryWindow::Bounded(2));
        filled(&mut history, 3);

        let users = history.windowed_user_contents();
        assert_eq!(users, vec!["question 1", "question 2"]);
    }

    #[test]
    fn empty_history_renders_empty_string() {
        let history = ConversationHistory::new(HistoryWindow::default());
        assert_eq!(history.rendered_window(), "");
    }
}
