//! Per-request flash messages.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Fire-and-forget sink for user-facing messages.
pub trait MessageSink: Send + Sync {
    fn add(&self, level: MessageLevel, text: String);

    fn error(&self, text: &str) {
        self.add(MessageLevel::Error, text.to_owned());
    }

    fn info(&self, text: &str) {
        self.add(MessageLevel::Info, text.to_owned());
    }
}

/// Message store scoped to a single request.
///
/// Cloning yields a handle to the same store, so the middleware that
/// created it can read what handlers and guards recorded.
#[derive(Debug, Clone, Default)]
pub struct FlashMessages {
    inner: Arc<Mutex<Vec<FlashMessage>>>,
}

impl FlashMessages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<FlashMessage> {
        self.inner.lock().clone()
    }

    /// Take every recorded message, leaving the store empty.
    #[must_use]
    pub fn drain(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.inner.lock())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl MessageSink for FlashMessages {
    fn add(&self, level: MessageLevel, text: String) {
        self.inner.lock().push(FlashMessage { level, text });
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_store() {
        let messages = FlashMessages::new();
        let handle = messages.clone();

        handle.error("first");
        handle.info("second");

        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages.snapshot(),
            vec![
                FlashMessage {
                    level: MessageLevel::Error,
                    text: "first".to_owned(),
                },
                FlashMessage {
                    level: MessageLevel::Info,
                    text: "second".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn drain_empties_the_store() {
        let messages = FlashMessages::new();
        messages.error("gone");

        assert_eq!(messages.drain().len(), 1);
        assert!(messages.is_empty());
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&FlashMessage {
            level: MessageLevel::Warning,
            text: "careful".to_owned(),
        })
        .unwrap();

        assert_eq!(json, r#"{"level":"warning","text":"careful"}"#);
    }
}
