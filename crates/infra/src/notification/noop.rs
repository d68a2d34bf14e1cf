//! 送信しない実装。SMTP 中継サーバーのない環境で使う

use async_trait::async_trait;
use aveniq_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        // 本文は個人情報を含むため長さだけ出す
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body_chars = email.text_body.chars().count(),
            "NOTIFICATION_BACKEND=noop のため送信しませんでした"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_送信せずに成功として扱う() {
        let email = EmailMessage {
            to:        "contact@aveniq-solutions.com".to_string(),
            subject:   "New Contact: Hi".to_string(),
            text_body: "Test".to_string(),
        };

        let result = NoopNotificationSender.send_email(&email).await;

        assert!(result.is_ok());
    }
}
