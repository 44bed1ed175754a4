//! 通知（トースト）
//!
//! オーケストレータが発生させ、フロントエンドが表示する。
//! CLIは `drain()` で即時出力し、Webは `active()` で表示中のものを取得する。

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// 通知の表示時間
pub const NOTIFICATION_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn title(&self) -> &'static str {
        match self {
            Level::Info => "Info",
            Level::Success => "Success",
            Level::Warning => "Warning",
            Level::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.raised_at + Duration::seconds(NOTIFICATION_TTL_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    pending: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.push_at(level, message, Utc::now());
    }

    pub fn push_at(&mut self, level: Level, message: impl Into<String>, at: DateTime<Utc>) {
        let message = message.into();
        tracing::debug!(level = ?level, %message, "notification");
        self.pending.push(Notification {
            level,
            message,
            raised_at: at,
        });
    }

    /// 未取得の通知をすべて取り出す
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    /// 表示期限内の通知
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.pending.iter().filter(|n| !n.is_expired(now)).collect()
    }

    /// 期限切れの通知を破棄
    pub fn dismiss_expired(&mut self, now: DateTime<Utc>) {
        self.pending.retain(|n| !n.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_drain_empties_queue() {
        let mut center = NotificationCenter::new();
        center.push(Level::Info, "one");
        center.push(Level::Warning, "two");

        let drained = center.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].level, Level::Warning);
        assert!(center.is_empty());
    }

    #[test]
    fn test_expiry_after_five_seconds() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new();
        center.push_at(Level::Success, "saved", start);

        assert_eq!(center.active(start + Duration::seconds(4)).len(), 1);
        assert!(center.active(start + Duration::seconds(5)).is_empty());

        center.dismiss_expired(start + Duration::seconds(6));
        assert!(center.is_empty());
    }
}
