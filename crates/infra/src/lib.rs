//! # Aveniq インフラ層
//!
//! 外部システム（PostgreSQL、SMTP 中継サーバー）との接続・通信を担当する。
//!
//! ## 設計方針
//!
//! リポジトリトレイトと通知送信トレイトの具体的な実装を提供し、
//! 外部システムの詳細をユースケース層から隠蔽する。
//!
//! ## 依存関係
//!
//! ```text
//! contact-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続プールとマイグレーション
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - [`notification`] - メール送信（SMTP / Noop）
//! - `mock` - インメモリモック（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
