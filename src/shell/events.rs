//! # Shell Events
//!
//! Broadcast channel for shell-level notifications using the observer
//! pattern. The external-input handoff itself travels over an explicit
//! one-shot slot; the bus only announces that it happened (and that
//! command packages finished initializing).

/// Notification emitted by the shell core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// `wait_for_user_input` was called; the next submitted line goes to
    /// the external listener instead of the dispatcher
    ExternalInputRequested { message: String },
    /// A lazily loaded command package finished initializing
    PackageLoaded { package: String },
}

/// Type alias for event handlers to reduce complexity
pub type ShellEventHandler = Box<dyn Fn(&ShellEvent) + Send + Sync>;

/// Simple in-memory event bus
#[derive(Default)]
pub struct ShellEventBus {
    handlers: Vec<ShellEventHandler>,
}

impl ShellEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: ShellEventHandler) {
        self.handlers.push(handler);
    }

    pub fn publish(&self, event: &ShellEvent) {
        for handler in &self.handlers {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn bus_delivers_events_to_every_handler() {
        let mut bus = ShellEventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Box::new(move |event| {
                seen.lock().unwrap().push(event.clone());
            }));
        }

        bus.publish(&ShellEvent::PackageLoaded {
            package: "deployer".into(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|event| matches!(
            event,
            ShellEvent::PackageLoaded { package } if package == "deployer"
        )));
    }

    #[test]
    fn bus_without_handlers_is_a_no_op() {
        let bus = ShellEventBus::new();
        bus.publish(&ShellEvent::ExternalInputRequested {
            message: "passphrase?".into(),
        });
        assert_eq!(bus.handler_count(), 0);
    }
}
