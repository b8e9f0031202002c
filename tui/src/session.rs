//! Interview session state
//!
//! A [`Session`] is created per flow and passed by reference into every
//! component call; there is no ambient global state, so many sessions
//! can coexist in one process (tests rely on this).

use std::collections::HashMap;

/// Progress of one tab in the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    Pending,
    Current,
    Completed,
}

/// One named step of the interview.
#[derive(Debug, Clone)]
pub struct Tab {
    pub name: String,
    pub status: TabStatus,
}

/// A collected answer, keyed by question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Selection(Vec<usize>),
    Time(i64),
}

/// Mutable state for one interview flow.
#[derive(Debug, Default)]
pub struct Session {
    tabs: Vec<Tab>,
    answers: HashMap<String, Answer>,
    cancelled: bool,
}

impl Session {
    /// Session without a tab bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with an ordered tab bar; the first tab starts current.
    pub fn with_tabs(names: &[&str]) -> Self {
        let tabs = names
            .iter()
            .enumerate()
            .map(|(i, name)| Tab {
                name: (*name).to_string(),
                status: if i == 0 {
                    TabStatus::Current
                } else {
                    TabStatus::Pending
                },
            })
            .collect();
        Self {
            tabs,
            answers: HashMap::new(),
            cancelled: false,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Complete the current tab and make the next one current.
    pub fn advance(&mut self) {
        let current = self
            .tabs
            .iter()
            .position(|t| t.status == TabStatus::Current);
        if let Some(i) = current {
            self.tabs[i].status = TabStatus::Completed;
            if let Some(next) = self.tabs.get_mut(i + 1) {
                next.status = TabStatus::Current;
            }
        }
    }

    pub fn record(&mut self, key: &str, answer: Answer) {
        self.answers.insert(key.to_string(), answer);
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.answers.get(key) {
            Some(Answer::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn selection(&self, key: &str) -> Option<&[usize]> {
        match self.answers.get(key) {
            Some(Answer::Selection(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn time(&self, key: &str) -> Option<i64> {
        match self.answers.get(key) {
            Some(Answer::Time(t)) => Some(*t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_advance_in_order() {
        let mut session = Session::with_tabs(&["what", "when", "confirm"]);
        assert_eq!(session.tabs()[0].status, TabStatus::Current);
        assert_eq!(session.tabs()[1].status, TabStatus::Pending);

        session.advance();
        assert_eq!(session.tabs()[0].status, TabStatus::Completed);
        assert_eq!(session.tabs()[1].status, TabStatus::Current);

        session.advance();
        session.advance(); // past the end is harmless
        assert_eq!(session.tabs()[2].status, TabStatus::Completed);
    }

    #[test]
    fn test_answers_round_trip_by_kind() {
        let mut session = Session::new();
        session.record("message", Answer::Text("fix parser".to_string()));
        session.record("fields", Answer::Selection(vec![0, 2]));
        session.record("when", Answer::Time(1_700_000_000));

        assert_eq!(session.text("message"), Some("fix parser"));
        assert_eq!(session.selection("fields"), Some(&[0, 2][..]));
        assert_eq!(session.time("when"), Some(1_700_000_000));
        // kind mismatch yields nothing
        assert_eq!(session.text("when"), None);
        assert_eq!(session.time("missing"), None);
    }

    #[test]
    fn test_cancellation_flag() {
        let mut session = Session::new();
        assert!(!session.is_cancelled());
        session.cancel();
        assert!(session.is_cancelled());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::new();
        let b = Session::new();
        a.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
