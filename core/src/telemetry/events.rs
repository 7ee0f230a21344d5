use log::{debug, info};
use std::collections::VecDeque;

const HISTORY_LIMIT: usize = 20;

/// Forwards session events to the `log` facade and keeps the most recent
/// entries for display.
#[derive(Debug, Clone)]
pub struct EventLog {
    history: VecDeque<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(message);
    }

    /// Logged but kept out of the visible history.
    pub fn trace(&self, message: &str) {
        debug!("{}", message);
    }

    /// Oldest entry first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
