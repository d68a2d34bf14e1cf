//! # 通知メールの組み立て
//!
//! 本文は固定のヘッダー行とフッターで内容を挟んだプレーンテキスト。
//! テンプレートエンジンは使わず、同じ入力からは常に同じメールを生成する。

use aveniq_domain::{contact::ContactMessage, notification::EmailMessage};

/// 件名の接頭辞
const SUBJECT_PREFIX: &str = "New Contact: ";

/// お問い合わせから管理者宛ての通知メールを組み立てる
///
/// 宛先はお問い合わせに記録された `admin_email`。
/// お問い合わせ者のアドレスは本文にのみ含める。
pub fn compose_notification(message: &ContactMessage, brand: &str) -> EmailMessage {
    let text_body = format!(
        "New Contact Form Submission - {brand}\n\
         \n\
         Name: {name}\n\
         Email: {email}\n\
         Subject: {subject}\n\
         \n\
         Message:\n\
         {body}\n\
         \n\
         ---\n\
         This is an automated message from your {brand} contact form.\n",
        name = message.name().as_str(),
        email = message.email().as_str(),
        subject = message.subject().as_str(),
        body = message.message().as_str(),
    );

    EmailMessage {
        to: message.admin_email().to_string(),
        subject: format!("{SUBJECT_PREFIX}{}", message.subject().as_str()),
        text_body,
    }
}
