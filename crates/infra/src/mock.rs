//! # テスト用モック
//!
//! ユースケース・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! aveniq-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aveniq_domain::{
    contact::{ContactMessage, ContactMessageId, EmailStatus},
    notification::{EmailMessage, NotificationError},
    status_check::StatusCheck,
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    repository::{ContactMessageRepository, StatusCheckRepository},
};

// ===== MockContactMessageRepository =====

#[derive(Clone, Default)]
pub struct MockContactMessageRepository {
    messages:     Arc<Mutex<Vec<ContactMessage>>>,
    fail_inserts: bool,
    inserts:      Arc<Mutex<usize>>,
}

impl MockContactMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// `insert` が常に失敗するリポジトリ
    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    /// 保存済みのお問い合わせ（挿入順）
    pub fn messages(&self) -> Vec<ContactMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// `insert` が呼ばれた回数（失敗を含む）
    pub fn insert_calls(&self) -> usize {
        *self.inserts.lock().unwrap()
    }
}

#[async_trait]
impl ContactMessageRepository for MockContactMessageRepository {
    async fn insert(&self, message: &ContactMessage) -> Result<(), InfraError> {
        *self.inserts.lock().unwrap() += 1;
        if self.fail_inserts {
            return Err(InfraError::from(sqlx::Error::PoolTimedOut));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn update_email_status(&self, message: &ContactMessage) -> Result<(), InfraError> {
        let mut messages = self.messages.lock().unwrap();
        let stored = messages
            .iter_mut()
            .find(|m| m.id() == message.id() && m.email_status() == EmailStatus::Pending)
            .ok_or_else(|| InfraError::conflict("ContactMessage", message.id().to_string()))?;
        *stored = message.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ContactMessageId,
    ) -> Result<Option<ContactMessage>, InfraError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id() == id)
            .cloned())
    }
}

// ===== MockStatusCheckRepository =====

#[derive(Clone, Default)]
pub struct MockStatusCheckRepository {
    checks: Arc<Mutex<Vec<StatusCheck>>>,
}

impl MockStatusCheckRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusCheckRepository for MockStatusCheckRepository {
    async fn insert(&self, check: &StatusCheck) -> Result<(), InfraError> {
        self.checks.lock().unwrap().push(check.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StatusCheck>, InfraError> {
        let mut checks = self.checks.lock().unwrap().clone();
        checks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        checks.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(checks)
    }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `failing_with` で指定したエラーを常に返すこともできる。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:    Arc<Mutex<Vec<EmailMessage>>>,
    failure: Option<NotificationError>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(error: NotificationError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// 送信を試みたメール（失敗を含む）
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(email.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
