//! User-facing notifications and confirmations.
//!
//! Two presentation styles exist: a transient banner that hides itself after a
//! few seconds, and blocking native-style alerts.

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// How notices are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStyle {
    Banner,
    Alert,
}

impl FromStr for NotifyStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "banner" => Ok(NotifyStyle::Banner),
            "alert" => Ok(NotifyStyle::Alert),
            other => Err(format!("unknown notify style: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    /// CSS-style class name used by banner renderers.
    pub fn class_name(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Presentation seam for the page host.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Ask the viewer a yes/no question before a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
}

/// A banner currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub notice: Notice,
    pub hide_at: DateTime<Utc>,
}

impl Banner {
    pub fn class(&self) -> String {
        format!("notification {}", self.notice.kind.class_name())
    }
}

/// Shows one banner at a time; a new notice replaces the previous one.
#[derive(Debug)]
pub struct BannerNotifier {
    duration: Duration,
    auto_confirm: bool,
    current: Mutex<Option<Banner>>,
}

impl BannerNotifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            auto_confirm: true,
            current: Mutex::new(None),
        }
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.auto_confirm = answer;
        self
    }

    /// The banner visible at `now`, if it has not timed out yet.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Option<Banner> {
        let current = self.current.lock().ok()?;
        current.as_ref().filter(|b| now < b.hide_at).cloned()
    }

    pub fn visible(&self) -> Option<Banner> {
        self.visible_at(Utc::now())
    }
}

impl Notifier for BannerNotifier {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
        let span = chrono::Duration::from_std(self.duration).unwrap_or(chrono::Duration::zero());
        if let Ok(mut current) = self.current.lock() {
            *current = Some(Banner {
                notice,
                hide_at: Utc::now() + span,
            });
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!("Confirm: {} -> {}", prompt, self.auto_confirm);
        self.auto_confirm
    }
}

/// Queues alert texts until the host displays them.
#[derive(Debug)]
pub struct AlertNotifier {
    auto_confirm: bool,
    pending: Mutex<VecDeque<String>>,
}

impl Default for AlertNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertNotifier {
    pub fn new() -> Self {
        Self {
            auto_confirm: true,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.auto_confirm = answer;
        self
    }

    /// Drain the alerts raised so far, oldest first.
    pub fn take_alerts(&self) -> Vec<String> {
        self.pending
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Notifier for AlertNotifier {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
        let text = match notice.kind {
            NoticeKind::Success => notice.message,
            NoticeKind::Error => format!("Error: {}", notice.message),
        };
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(text);
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!("Confirm: {} -> {}", prompt, self.auto_confirm);
        self.auto_confirm
    }
}

fn log_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => tracing::info!("{}", notice.message),
        NoticeKind::Error => tracing::warn!("{}", notice.message),
    }
}
