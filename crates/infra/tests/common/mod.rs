//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use aveniq_domain::contact::{ContactForm, ContactMessage, ContactMessageId, NewContactMessage};
use chrono::{DateTime, Utc};

pub const ADMIN_EMAIL: &str = "contact@aveniq-solutions.com";

/// マイクロ秒精度に丸めた固定時刻（PostgreSQL の TIMESTAMPTZ 精度に合わせる）
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap()
}

pub fn contact_form(subject: &str) -> ContactForm {
    ContactForm {
        name:    Some("Ana".to_string()),
        email:   Some("ana@example.com".to_string()),
        subject: Some(subject.to_string()),
        message: Some("Test".to_string()),
    }
}

/// 受付直後（pending）のお問い合わせを生成する
pub fn pending_contact_message(subject: &str) -> ContactMessage {
    ContactMessage::new(NewContactMessage {
        id:          ContactMessageId::new(),
        contact:     contact_form(subject).validate().unwrap(),
        admin_email: ADMIN_EMAIL.to_string(),
        now:         test_now(),
    })
}
