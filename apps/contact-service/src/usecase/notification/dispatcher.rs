//! # 通知のバックグラウンド実行
//!
//! お問い合わせの保存が完了した後、通知送信をリクエスト処理から切り離して実行する。
//!
//! ## 設計方針
//!
//! - **待たない**: `schedule()` は同期関数で、送信の完了を待たずに戻る
//! - **同時実行数の上限**: 送信中のタスクは `Semaphore` で上限を設ける。
//!   許可の取得はバックグラウンドタスク内で行うため、`schedule()` はブロックしない
//! - **キャンセルなし**: 一度スケジュールした送信は中断しない
//! - **シャットダウン時の待機**: [`BackgroundDispatcher::drain`] で実行中・待機中の送信の完了を待つ

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use aveniq_domain::contact::ContactMessage;
use tokio::sync::{Notify, Semaphore};

use super::NotificationService;

/// 保存済みのお問い合わせの通知送信を予約する
///
/// ハンドラのテストでは記録のみ行う実装に差し替える。
pub trait DispatchScheduler: Send + Sync {
    fn schedule(&self, message: ContactMessage);
}

/// 未完了の送信タスク数
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle:  Notify,
}

/// タスク終了時（パニック時を含む）に未完了数を減らすガード
struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn register(in_flight: &Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(in_flight))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// tokio ランタイム上で通知を送信するスケジューラ
pub struct BackgroundDispatcher {
    service:   Arc<NotificationService>,
    permits:   Arc<Semaphore>,
    in_flight: Arc<InFlight>,
}

impl BackgroundDispatcher {
    /// `max_concurrency` は同時に送信できる通知の上限（1 以上）
    pub fn new(service: Arc<NotificationService>, max_concurrency: usize) -> Self {
        Self {
            service,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// 未完了（送信中・許可待ち）のタスク数
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// 未完了のタスクがなくなるまで待つ
    ///
    /// `timeout` 以内にすべて完了すれば `true`、時間切れなら `false` を返す。
    pub async fn drain(&self, timeout: Duration) -> bool {
        let wait_idle = async {
            loop {
                // notify_waiters() の取りこぼしを防ぐため、件数の確認より先に登録する
                let notified = self.in_flight.idle.notified();
                if self.in_flight() == 0 {
                    return;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait_idle).await.is_ok()
    }
}

impl DispatchScheduler for BackgroundDispatcher {
    fn schedule(&self, message: ContactMessage) {
        let guard = InFlightGuard::register(&self.in_flight);
        let service = Arc::clone(&self.service);
        let permits = Arc::clone(&self.permits);
        let contact_id = *message.id();

        tokio::spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                tracing::error!(%contact_id, "送信許可の取得に失敗したため通知を送信しません");
                return;
            };

            let outcome = service.dispatch(message).await;
            tracing::debug!(
                %contact_id,
                success = outcome.success,
                detail = %outcome.detail,
                "通知の送信処理が完了"
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use aveniq_domain::{
        clock::SystemClock,
        contact::{ContactForm, ContactMessageId, EmailStatus, NewContactMessage},
        notification::{EmailMessage, NotificationError},
    };
    use aveniq_infra::{
        mock::{MockContactMessageRepository, MockNotificationSender},
        notification::NotificationSender,
        repository::ContactMessageRepository,
    };
    use chrono::Utc;

    use super::*;

    /// 送信に一定時間かかり、同時実行数の最大値を記録するセンダー
    #[derive(Default)]
    struct SlowSender {
        delay:   Duration,
        current: AtomicUsize,
        peak:    AtomicUsize,
        sent:    Mutex<usize>,
    }

    #[async_trait]
    impl NotificationSender for SlowSender {
        async fn send_email(&self, _email: &EmailMessage) -> Result<(), NotificationError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn pending_message(subject: &str) -> ContactMessage {
        let contact = ContactForm {
            name:    Some("Ana".to_string()),
            email:   Some("ana@example.com".to_string()),
            subject: Some(subject.to_string()),
            message: Some("Test".to_string()),
        }
        .validate()
        .unwrap();

        ContactMessage::new(NewContactMessage {
            id: ContactMessageId::new(),
            contact,
            admin_email: "contact@aveniq-solutions.com".to_string(),
            now: Utc::now(),
        })
    }

    fn make_dispatcher(
        sender: Arc<dyn NotificationSender>,
        repository: MockContactMessageRepository,
        max_concurrency: usize,
    ) -> BackgroundDispatcher {
        let service = NotificationService::new(
            sender,
            Arc::new(repository),
            Arc::new(SystemClock),
            "Aveniq Solutions",
        );
        BackgroundDispatcher::new(Arc::new(service), max_concurrency)
    }

    #[tokio::test]
    async fn test_スケジュールした送信はdrainで完了を待てる() {
        // Given
        let sender = MockNotificationSender::new();
        let repository = MockContactMessageRepository::new();
        let message = pending_message("Hi");
        repository.insert(&message).await.unwrap();
        let sut = make_dispatcher(Arc::new(sender.clone()), repository.clone(), 4);

        // When
        sut.schedule(message.clone());
        let drained = sut.drain(Duration::from_secs(5)).await;

        // Then
        assert!(drained);
        assert_eq!(sut.in_flight(), 0);
        assert_eq!(sender.sent_emails().len(), 1);
        let stored = repository.find_by_id(message.id()).await.unwrap().unwrap();
        assert_eq!(stored.email_status(), EmailStatus::Sent);
    }

    #[tokio::test]
    async fn test_scheduleは送信の完了を待たずに戻る() {
        // Given
        let sender = Arc::new(SlowSender {
            delay: Duration::from_millis(200),
            ..SlowSender::default()
        });
        let sut = make_dispatcher(sender.clone(), MockContactMessageRepository::new(), 4);

        // When
        sut.schedule(pending_message("Hi"));

        // Then
        assert_eq!(sut.in_flight(), 1);
        assert_eq!(*sender.sent.lock().unwrap(), 0);
        assert!(sut.drain(Duration::from_secs(5)).await);
        assert_eq!(*sender.sent.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_同時に送信するタスク数は上限を超えない() {
        // Given
        let sender = Arc::new(SlowSender {
            delay: Duration::from_millis(50),
            ..SlowSender::default()
        });
        let sut = make_dispatcher(sender.clone(), MockContactMessageRepository::new(), 2);

        // When
        for i in 0..6 {
            sut.schedule(pending_message(&format!("Hi {i}")));
        }
        let drained = sut.drain(Duration::from_secs(5)).await;

        // Then
        assert!(drained);
        assert_eq!(*sender.sent.lock().unwrap(), 6);
        assert!(sender.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_時間内に完了しない場合drainはfalseを返す() {
        // Given
        let sender = Arc::new(SlowSender {
            delay: Duration::from_secs(10),
            ..SlowSender::default()
        });
        let sut = make_dispatcher(sender, MockContactMessageRepository::new(), 1);
        sut.schedule(pending_message("Hi"));

        // When
        let drained = sut.drain(Duration::from_millis(50)).await;

        // Then
        assert!(!drained);
        assert_eq!(sut.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_未完了のタスクがなければdrainは即座にtrueを返す() {
        let sut = make_dispatcher(
            Arc::new(MockNotificationSender::new()),
            MockContactMessageRepository::new(),
            1,
        );

        assert!(sut.drain(Duration::from_millis(1)).await);
    }
}
