//! お問い合わせ受付ユースケース
//!
//! 検証 → 保存 → 通知の予約 の順に処理する。
//! 通知は保存が成功した後にのみ予約し、その完了は待たない。

use std::sync::Arc;

use aveniq_domain::{
    clock::Clock,
    contact::{ContactForm, ContactMessage, ContactMessageId, NewContactMessage},
};
use aveniq_infra::repository::ContactMessageRepository;
use aveniq_shared::{event_log::event, log_business_event};

use super::notification::DispatchScheduler;
use crate::error::CoreError;

/// 受付完了時にお問い合わせ者へ返すメッセージ
pub const SUBMITTED_MESSAGE: &str =
    "Contact form submitted successfully! We'll get back to you soon.";

/// 受付結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub contact_id: ContactMessageId,
    pub message:    &'static str,
}

/// お問い合わせ受付ユースケース
pub struct ContactUseCaseImpl {
    repository:  Arc<dyn ContactMessageRepository>,
    scheduler:   Arc<dyn DispatchScheduler>,
    clock:       Arc<dyn Clock>,
    admin_email: String,
}

impl ContactUseCaseImpl {
    pub fn new(
        repository: Arc<dyn ContactMessageRepository>,
        scheduler: Arc<dyn DispatchScheduler>,
        clock: Arc<dyn Clock>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            scheduler,
            clock,
            admin_email: admin_email.into(),
        }
    }

    /// お問い合わせを受け付ける
    ///
    /// 1. 入力を検証（失敗時は保存も通知もしない）
    /// 2. `pending` 状態で保存（失敗時は通知しない）
    /// 3. 通知を予約し、完了を待たずに受付結果を返す
    pub async fn submit(&self, form: ContactForm) -> Result<SubmissionReceipt, CoreError> {
        let contact = form.validate()?;

        let message = ContactMessage::new(NewContactMessage {
            id: ContactMessageId::new(),
            contact,
            admin_email: self.admin_email.clone(),
            now: self.clock.now(),
        });

        self.repository.insert(&message).await?;

        let contact_id = *message.id();
        log_business_event!(
            event.category = event::category::CONTACT,
            event.action = event::action::CONTACT_SUBMITTED,
            event.entity_type = event::entity_type::CONTACT_MESSAGE,
            event.entity_id = %contact_id,
            event.result = event::result::SUCCESS,
            "お問い合わせを受け付けました"
        );

        self.scheduler.schedule(message);

        Ok(SubmissionReceipt {
            contact_id,
            message: SUBMITTED_MESSAGE,
        })
    }
}
