//! # ユースケース層
//!
//! Contact Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリ・送信・時刻を `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `contact`: お問い合わせ受付（検証 → 保存 → 通知の予約）
//! - `notification`: 通知メールの生成・送信・結果記録
//! - `status_check`: 疎通確認の記録

pub mod contact;
pub mod notification;
pub mod status_check;

pub use contact::{ContactUseCaseImpl, SUBMITTED_MESSAGE, SubmissionReceipt};
pub use status_check::StatusCheckUseCaseImpl;
