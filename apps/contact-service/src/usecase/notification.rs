//! # 通知ユースケース
//!
//! お問い合わせ受付に伴う管理者宛てメールの生成・送信・結果記録を統合する。
//!
//! ## モジュール構成
//!
//! - [`composer`] - お問い合わせ内容から固定書式のメールを組み立てる
//! - [`service`] - メール生成 + 送信 + 送信結果の記録を統合するサービス
//! - [`dispatcher`] - 送信をリクエスト処理から切り離して実行するスケジューラ

pub mod composer;
pub mod dispatcher;
pub mod service;

pub use composer::compose_notification;
pub use dispatcher::{BackgroundDispatcher, DispatchScheduler};
pub use service::NotificationService;
