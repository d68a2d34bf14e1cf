//! # リポジトリ
//!
//! エンティティの永続化を担当するリポジトリトレイトと PostgreSQL 実装。

pub mod contact_message_repository;
pub mod status_check_repository;

pub use contact_message_repository::{ContactMessageRepository, PostgresContactMessageRepository};
pub use status_check_repository::{PostgresStatusCheckRepository, StatusCheckRepository};
