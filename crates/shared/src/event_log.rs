//! # 構造化ログのフィールド規約
//!
//! JSON 出力ではドット区切りのキー（`event.action`、`error.kind` など）がそのまま
//! フラットなキーになる。値は下の定数から選び、表記ゆれを防ぐ。
//!
//! ```bash
//! # 受付から通知までの流れだけを抜き出す
//! jq 'select(.["event.kind"] == "business_event") | {ts: .timestamp, action: .["event.action"], id: .["event.entity_id"]}'
//! ```

/// 業務上の出来事を `info` レベルで記録する
///
/// `event.kind = "business_event"` を先頭に付けて [`tracing::info!`] に渡す。
/// `event.category` / `event.action` / `event.result` は毎回指定し、
/// 対象があれば `event.entity_type` / `event.entity_id` も付ける。
///
/// 展開先は `::tracing` を参照するため、呼び出し側も `tracing` に依存する必要がある。
#[macro_export]
macro_rules! log_business_event {
    ($($field:tt)*) => {
        ::tracing::info!(event.kind = "business_event", $($field)*)
    };
}

/// `event.*` フィールドの値
pub mod event {
    pub mod category {
        pub const CONTACT: &str = "contact";
        pub const NOTIFICATION: &str = "notification";
        pub const STATUS_CHECK: &str = "status_check";
    }

    /// `<category>.<過去分詞>` 形式
    pub mod action {
        pub const CONTACT_SUBMITTED: &str = "contact.submitted";
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        pub const STATUS_CHECK_CREATED: &str = "status_check.created";
    }

    pub mod entity_type {
        pub const CONTACT_MESSAGE: &str = "contact_message";
        pub const STATUS_CHECK: &str = "status_check";
    }

    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// `error.*` フィールドの値
///
/// 業務イベントとは別に、`tracing::error!` / `tracing::warn!` へ直接付ける。
pub mod error {
    pub mod category {
        /// 自サービスが所有する資源（PostgreSQL）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// SMTP 中継サーバー
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const INTERNAL: &str = "internal";
        pub const EMAIL_DELIVERY: &str = "email_delivery";
    }
}
