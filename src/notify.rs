//! Transient user-facing notices.
//!
//! Pipeline operations report progress and failures twice: once through
//! their `Result`, and once as a [`Notice`] for whatever surface is hosting
//! the pipeline (a web portal would render these as toasts). Notices ride
//! a [`flume`] channel so the host can drain them on its own schedule; a
//! dropped receiver silently disables them, which keeps headless use free of
//! wiring.

use chrono::{DateTime, Utc};

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Lowercase label, convenient for log lines and UI styling hooks.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A single transient notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub when: DateTime<Utc>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            when: Utc::now(),
        }
    }
}

/// Cloneable sender half for emitting notices.
///
/// # Examples
///
/// ```
/// use ragline::notify::{Notifier, NoticeLevel};
///
/// let (notifier, notices) = Notifier::channel();
/// notifier.success("임베딩 완료");
/// let notice = notices.try_recv().unwrap();
/// assert_eq!(notice.level, NoticeLevel::Success);
/// ```
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: flume::Sender<Notice>,
}

impl Notifier {
    /// Creates a notifier and the receiver that drains its notices.
    #[must_use]
    pub fn channel() -> (Self, flume::Receiver<Notice>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    /// Creates a notifier whose notices go nowhere.
    ///
    /// Useful for components exercised outside a hosting surface, e.g. in
    /// unit tests that only care about return values.
    #[must_use]
    pub fn disconnected() -> Self {
        let (tx, _rx) = flume::unbounded();
        Self { tx }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(NoticeLevel::Error, message);
    }

    fn emit(&self, level: NoticeLevel, message: impl Into<String>) {
        // A closed channel means no surface is listening; notices are
        // advisory, so the send result is intentionally discarded.
        let _ = self.tx.send(Notice::new(level, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_arrive_in_emission_order() {
        let (notifier, notices) = Notifier::channel();
        notifier.info("first");
        notifier.error("second");

        let drained: Vec<Notice> = notices.drain().collect();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NoticeLevel::Info);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].level, NoticeLevel::Error);
    }

    #[test]
    fn disconnected_notifier_does_not_panic() {
        let notifier = Notifier::disconnected();
        notifier.warning("nobody listening");
    }

    #[test]
    fn clones_share_one_channel() {
        let (notifier, notices) = Notifier::channel();
        let clone = notifier.clone();
        clone.success("from clone");
        assert_eq!(notices.try_recv().unwrap().message, "from clone");
    }
}
