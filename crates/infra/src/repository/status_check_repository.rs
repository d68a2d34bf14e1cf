//! # StatusCheckRepository
//!
//! ステータスチェックの永続化を担当するリポジトリ。

use async_trait::async_trait;
use aveniq_domain::status_check::{ClientName, StatusCheck, StatusCheckId};
use sqlx::{PgPool, Row};

use crate::error::InfraError;

#[async_trait]
pub trait StatusCheckRepository: Send + Sync {
    async fn insert(&self, check: &StatusCheck) -> Result<(), InfraError>;

    /// 新しい順に最大 `limit` 件を返す
    async fn list_recent(&self, limit: i64) -> Result<Vec<StatusCheck>, InfraError>;
}

#[derive(Debug, Clone)]
pub struct PostgresStatusCheckRepository {
    pool: PgPool,
}

impl PostgresStatusCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusCheckRepository for PostgresStatusCheckRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, check: &StatusCheck) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO status_checks (id, client_name, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(check.id.as_uuid())
        .bind(check.client_name.as_str())
        .bind(check.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(limit = limit))]
    async fn list_recent(&self, limit: i64) -> Result<Vec<StatusCheck>, InfraError> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_name, created_at
            FROM status_checks
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<StatusCheck, InfraError> {
                let client_name = ClientName::new(row.try_get::<String, _>("client_name")?)
                    .map_err(|e| InfraError::unexpected(e.to_string()))?;
                Ok(StatusCheck::new(
                    StatusCheckId::from_uuid(row.try_get("id")?),
                    client_name,
                    row.try_get("created_at")?,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresStatusCheckRepository>();
    }
}
