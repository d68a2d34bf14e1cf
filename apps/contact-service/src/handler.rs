//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲

pub mod contact;
pub mod health;
pub mod status;

pub use contact::{ContactState, submit_contact};
pub use health::{ReadinessState, health_check, readiness_check, root};
pub use status::{StatusState, create_status_check, list_status_checks};
