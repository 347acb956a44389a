//! User-visible notices raised by the editor

use colored::Colorize;
use log::{error, info, warn};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::i18n::MessageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub key: MessageKey,
    /// Localized text
    pub message: String,
    /// Technical detail, if any
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, key: MessageKey, message: impl Into<String>) -> Self {
        Self {
            level,
            key,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => write!(f, "{}", self.message),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!("{}", notice),
            NoticeLevel::Warning => warn!("{}", notice),
            NoticeLevel::Error => error!("{}", notice),
        }
    }
}

/// Prints notices to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{} {}", "✓".green().bold(), notice.message.green()),
            NoticeLevel::Warning => eprintln!("{} {}", "!".yellow().bold(), notice.message.yellow()),
            NoticeLevel::Error => {
                eprintln!("{} {}", "✗".red().bold(), notice.message.red());
                if let Some(detail) = &notice.detail {
                    eprintln!("  {}", detail.dimmed());
                }
            }
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}
