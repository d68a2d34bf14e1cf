//! ステータスチェックユースケース
//!
//! クライアントの疎通確認を記録・一覧する。お問い合わせ処理とは独立している。

use std::sync::Arc;

use aveniq_domain::{
    clock::Clock,
    status_check::{ClientName, StatusCheck, StatusCheckId},
};
use aveniq_infra::repository::StatusCheckRepository;
use aveniq_shared::{event_log::event, log_business_event};

use crate::error::CoreError;

/// 一覧で返す最大件数
pub const STATUS_CHECK_LIST_LIMIT: i64 = 1000;

/// ステータスチェックユースケース
pub struct StatusCheckUseCaseImpl {
    repository: Arc<dyn StatusCheckRepository>,
    clock:      Arc<dyn Clock>,
}

impl StatusCheckUseCaseImpl {
    pub fn new(repository: Arc<dyn StatusCheckRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// ステータスチェックを記録する
    pub async fn create(&self, client_name: String) -> Result<StatusCheck, CoreError> {
        let client_name = ClientName::new(client_name)?;
        let check = StatusCheck::new(StatusCheckId::new(), client_name, self.clock.now());

        self.repository.insert(&check).await?;

        log_business_event!(
            event.category = event::category::STATUS_CHECK,
            event.action = event::action::STATUS_CHECK_CREATED,
            event.entity_type = event::entity_type::STATUS_CHECK,
            event.entity_id = %check.id,
            event.result = event::result::SUCCESS,
            "ステータスチェックを記録しました"
        );

        Ok(check)
    }

    /// 新しい順に最大 [`STATUS_CHECK_LIST_LIMIT`] 件を返す
    pub async fn list(&self) -> Result<Vec<StatusCheck>, CoreError> {
        Ok(self.repository.list_recent(STATUS_CHECK_LIST_LIMIT).await?)
    }
}

#[cfg(test)]
mod tests {
    use aveniq_domain::clock::FixedClock;
    use aveniq_infra::mock::MockStatusCheckRepository;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_作成したステータスチェックが一覧に含まれる() {
        // Given
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let sut = StatusCheckUseCaseImpl::new(
            Arc::new(MockStatusCheckRepository::new()),
            Arc::new(FixedClock::new(now)),
        );

        // When
        let created = sut.create("frontend".to_string()).await.unwrap();
        let listed = sut.list().await.unwrap();

        // Then
        assert_eq!(created.client_name.as_str(), "frontend");
        assert_eq!(created.timestamp, now);
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_空のクライアント名は検証エラーになる() {
        let sut = StatusCheckUseCaseImpl::new(
            Arc::new(MockStatusCheckRepository::new()),
            Arc::new(FixedClock::new(Utc::now())),
        );

        let result = sut.create("  ".to_string()).await;

        assert!(matches!(result, Err(CoreError::Validation(_))), "{result:?}");
        assert!(sut.list().await.unwrap().is_empty());
    }
}
