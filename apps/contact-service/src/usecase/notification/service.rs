//! # 通知サービス
//!
//! メール生成 → 送信 → 送信結果の記録を統合するサービス。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: `dispatch()` は送信に失敗してもエラーを返さず、
//!   結果を [`DispatchOutcome`] として返す
//! - **1 回のみ試行**: 失敗しても再送しない
//! - **結果の記録**: 送信後にお問い合わせの `email_status` を `sent` / `failed` に更新する。
//!   記録に失敗してもログ出力のみ行う

use std::sync::Arc;

use aveniq_domain::{
    clock::Clock,
    contact::ContactMessage,
    notification::{DispatchOutcome, NotificationError},
};
use aveniq_infra::{notification::NotificationSender, repository::ContactMessageRepository};
use aveniq_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::compose_notification;

/// 通知サービス
///
/// プロセス全体で 1 つ生成し、[`BackgroundDispatcher`](super::BackgroundDispatcher)
/// から共有して使う。
pub struct NotificationService {
    sender:     Arc<dyn NotificationSender>,
    repository: Arc<dyn ContactMessageRepository>,
    clock:      Arc<dyn Clock>,
    brand:      String,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        repository: Arc<dyn ContactMessageRepository>,
        clock: Arc<dyn Clock>,
        brand: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            repository,
            clock,
            brand: brand.into(),
        }
    }

    /// 管理者宛ての通知を 1 回だけ送信し、結果を記録する
    ///
    /// 送信エラーは呼び出し元に伝播せず、戻り値の `DispatchOutcome` に変換する。
    #[tracing::instrument(skip_all, fields(contact_id = %message.id()))]
    pub async fn dispatch(&self, message: ContactMessage) -> DispatchOutcome {
        let email = compose_notification(&message, &self.brand);

        let result = self.sender.send_email(&email).await;
        let outcome = DispatchOutcome::from(&result);

        match &result {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::CONTACT_MESSAGE,
                    event.entity_id = %message.id(),
                    event.result = event::result::SUCCESS,
                    "通知メール送信成功"
                );
            }
            Err(e) => log_failure(&message, e),
        }

        self.record_outcome(message, &outcome).await;
        outcome
    }

    /// 送信結果をお問い合わせに記録する
    async fn record_outcome(&self, message: ContactMessage, outcome: &DispatchOutcome) {
        let id = *message.id();
        let now = self.clock.now();
        let transitioned = if outcome.success {
            message.mark_sent(outcome.detail.as_str(), now)
        } else {
            message.mark_failed(outcome.detail.as_str(), now)
        };

        let updated = match transitioned {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(contact_id = %id, error = %e, "送信結果の状態遷移に失敗");
                return;
            }
        };

        if let Err(e) = self.repository.update_email_status(&updated).await {
            if e.as_conflict().is_some() {
                tracing::warn!(contact_id = %id, error = %e, "送信結果は既に記録されています");
            } else {
                tracing::error!(
                    contact_id = %id,
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::DATABASE,
                    error = %e,
                    "送信結果の記録に失敗"
                );
            }
        }
    }
}

fn log_failure(message: &ContactMessage, err: &NotificationError) {
    log_business_event!(
        event.category = event::category::NOTIFICATION,
        event.action = event::action::NOTIFICATION_FAILED,
        event.entity_type = event::entity_type::CONTACT_MESSAGE,
        event.entity_id = %message.id(),
        event.result = event::result::FAILURE,
        error.category = error::category::EXTERNAL_SERVICE,
        error.kind = error::kind::EMAIL_DELIVERY,
        notification.failure = err.kind(),
        error = %err,
        "通知メール送信失敗"
    );
}
