//! # Aveniq ドメイン層
//!
//! お問い合わせ受付のビジネスルールを担うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: ContactMessage, StatusCheck）
//! - **値オブジェクト**: 生成時に検証される不変オブジェクト（例: Email, Subject）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! contact-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）には一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use aveniq_domain::contact::{ContactForm, EmailStatus};
//!
//! let form = ContactForm {
//!     name:    Some("Ana".to_string()),
//!     email:   Some("ana@example.com".to_string()),
//!     subject: Some("Hi".to_string()),
//!     message: Some("Test".to_string()),
//! };
//! let validated = form.validate().unwrap();
//! assert_eq!(validated.email.as_str(), "ana@example.com");
//! assert_eq!(EmailStatus::default(), EmailStatus::Pending);
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod contact;
pub mod error;
pub mod notification;
pub mod status_check;

pub use error::DomainError;
