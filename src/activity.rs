use chrono::{DateTime, Local};
use std::collections::VecDeque;

const MAX_EVENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventType {
    Info,
    Success,
    Error,
    Copy,
}

#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Local>,
    pub event_type: EventType,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ActivityLog {
    events: VecDeque<ActivityEvent>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn push(&mut self, event_type: EventType, message: impl Into<String>) {
        if self.events.len() >= MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(ActivityEvent {
            timestamp: Local::now(),
            event_type,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &VecDeque<ActivityEvent> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = ActivityLog::new();
        for i in 0..MAX_EVENTS + 5 {
            log.push(EventType::Info, format!("event {}", i));
        }
        assert_eq!(log.events().len(), MAX_EVENTS);
        assert_eq!(log.events().front().unwrap().message, "event 5");
        assert_eq!(
            log.events().back().unwrap().message,
            format!("event {}", MAX_EVENTS + 4)
        );
    }
}
