//! # ContactMessageRepository
//!
//! お問い合わせの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **挿入は一度だけ**: 受付時に `pending` で 1 行挿入する
//! - **送信結果は条件付き UPDATE**: `email_status = 'pending'` の行だけを更新し、
//!   二重記録を DB レベルで防ぐ
//! - **削除しない**: 保持期間の管理はこのサービスの責務外

use async_trait::async_trait;
use aveniq_domain::contact::{
    ContactMessage,
    ContactMessageId,
    ContactMessageRecord,
    ContactName,
    Email,
    EmailStatus,
    MessageBody,
    Subject,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::InfraError;

/// お問い合わせリポジトリトレイト
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    /// 受付済みお問い合わせを挿入する
    async fn insert(&self, message: &ContactMessage) -> Result<(), InfraError>;

    /// 送信結果（`email_status` / `dispatched_at` / `dispatch_detail`）を記録する
    ///
    /// 対象行が `pending` でない場合は `Conflict` を返す。
    async fn update_email_status(&self, message: &ContactMessage) -> Result<(), InfraError>;

    async fn find_by_id(
        &self,
        id: &ContactMessageId,
    ) -> Result<Option<ContactMessage>, InfraError>;
}

/// PostgreSQL 実装の ContactMessageRepository
#[derive(Debug, Clone)]
pub struct PostgresContactMessageRepository {
    pool: PgPool,
}

impl PostgresContactMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactMessageRepository for PostgresContactMessageRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(contact_id = %message.id()))]
    async fn insert(&self, message: &ContactMessage) -> Result<(), InfraError> {
        let status: &'static str = message.email_status().into();

        sqlx::query(
            r#"
            INSERT INTO contact_messages (
                id, name, email, subject, message,
                created_at, email_status, admin_email,
                dispatched_at, dispatch_detail
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.name().as_str())
        .bind(message.email().as_str())
        .bind(message.subject().as_str())
        .bind(message.message().as_str())
        .bind(message.created_at())
        .bind(status)
        .bind(message.admin_email())
        .bind(message.dispatched_at())
        .bind(message.dispatch_detail())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(contact_id = %message.id()))]
    async fn update_email_status(&self, message: &ContactMessage) -> Result<(), InfraError> {
        let status: &'static str = message.email_status().into();

        let result = sqlx::query(
            r#"
            UPDATE contact_messages
            SET email_status = $2, dispatched_at = $3, dispatch_detail = $4
            WHERE id = $1 AND email_status = 'pending'
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(status)
        .bind(message.dispatched_at())
        .bind(message.dispatch_detail())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict(
                "ContactMessage",
                message.id().to_string(),
            ));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(contact_id = %id))]
    async fn find_by_id(
        &self,
        id: &ContactMessageId,
    ) -> Result<Option<ContactMessage>, InfraError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, name, email, subject, message,
                created_at, email_status, admin_email,
                dispatched_at, dispatch_detail
            FROM contact_messages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(to_contact_message).transpose()
    }
}

fn to_contact_message(row: &PgRow) -> Result<ContactMessage, InfraError> {
    let status: String = row.try_get("email_status")?;
    let email_status = status
        .parse::<EmailStatus>()
        .map_err(|e| InfraError::unexpected(format!("不正な email_status: {status} ({e})")))?;

    Ok(ContactMessage::from_db(ContactMessageRecord {
        id: ContactMessageId::from_uuid(row.try_get("id")?),
        name: ContactName::new(row.try_get::<String, _>("name")?)
            .map_err(|e| InfraError::unexpected(e.to_string()))?,
        email: Email::new(row.try_get::<String, _>("email")?)
            .map_err(|e| InfraError::unexpected(e.to_string()))?,
        subject: Subject::new(row.try_get::<String, _>("subject")?)
            .map_err(|e| InfraError::unexpected(e.to_string()))?,
        message: MessageBody::new(row.try_get::<String, _>("message")?)
            .map_err(|e| InfraError::unexpected(e.to_string()))?,
        created_at: row.try_get("created_at")?,
        email_status,
        admin_email: row.try_get("admin_email")?,
        dispatched_at: row.try_get("dispatched_at")?,
        dispatch_detail: row.try_get("dispatch_detail")?,
    }))
}
