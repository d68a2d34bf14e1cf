//! # メール送信
//!
//! 送信手段は起動時に `NOTIFICATION_BACKEND` で選ぶ。
//!
//! | 実装 | 用途 |
//! |------|------|
//! | [`SmtpNotificationSender`] | SMTP 中継サーバー経由で送る |
//! | [`NoopNotificationSender`] | 送らずにログだけ残す（開発環境） |
//!
//! どの実装も 1 通につき 1 回だけ試行し、再送はしない。

mod noop;
mod smtp;

use async_trait::async_trait;
use aveniq_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSecurity, SmtpSettings};

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 失敗時は接続・認証・送信のどの段階で失敗したかを返す
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
