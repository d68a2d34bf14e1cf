//! # お問い合わせ
//!
//! お問い合わせフォームの入力検証と、受付済みお問い合わせ（エンティティ）を定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`ContactForm`] | フォーム入力（未検証） |
//! | [`ValidatedContact`] | 検証済みの入力 |
//! | [`ContactMessage`] | 受付済みお問い合わせ |
//! | [`EmailStatus`] | 管理者宛て通知メールの送信状態 |
//!
//! ## 設計方針
//!
//! - **検証は純粋関数**: [`ContactForm::validate`] は副作用を持たない
//! - **全件報告**: 複数フィールドの違反は 1 つのメッセージにまとめて返す
//! - **一方向の状態遷移**: `Pending → Sent` / `Pending → Failed` のみ許可

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use validator::ValidateEmail;

use crate::DomainError;

define_id! {
    /// お問い合わせ ID
    ///
    /// contact_messages テーブルの主キー。
    pub struct ContactMessageId;
}

define_text! {
    /// お問い合わせ者の氏名
    pub struct ContactName: "名前", max 200, redacted;
}

define_text! {
    /// 件名
    pub struct Subject: "件名", max 300;
}

define_text! {
    /// 本文。インデントや改行を含め、入力されたとおりに保持する
    pub struct MessageBody: "本文", max 10_000, verbatim, redacted;
}

/// メールアドレス（値オブジェクト）
///
/// 構文チェックは `validator` クレートの HTML5 準拠の判定に委ねる。
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        if !value.validate_email() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Email").field(&"[REDACTED]").finish()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 通知メールの送信状態
///
/// contact_messages テーブルの `email_status` カラムに小文字で格納される。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmailStatus {
    /// 受付直後。送信結果は未確定
    #[default]
    Pending,
    /// 送信成功
    Sent,
    /// 送信失敗（再送はしない）
    Failed,
}

/// お問い合わせフォームの入力
///
/// HTTP リクエストボディをそのまま受け取るため、全フィールドを任意とする。
/// 欠落・空文字は [`validate`](Self::validate) で検出する。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name:    Option<String>,
    pub email:   Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// 検証済みのお問い合わせ入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub name:    ContactName,
    pub email:   Email,
    pub subject: Subject,
    pub message: MessageBody,
}

impl ContactForm {
    /// 入力を検証する
    ///
    /// すべてのフィールドを検査し、違反があれば `"; "` 区切りで 1 つの
    /// `DomainError::Validation` にまとめて返す。
    pub fn validate(self) -> Result<ValidatedContact, DomainError> {
        let mut violations = Vec::new();

        let name = collect(
            ContactName::new(self.name.unwrap_or_default()),
            &mut violations,
        );
        let email = collect(Email::new(self.email.unwrap_or_default()), &mut violations);
        let subject = collect(
            Subject::new(self.subject.unwrap_or_default()),
            &mut violations,
        );
        let message = collect(
            MessageBody::new(self.message.unwrap_or_default()),
            &mut violations,
        );

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) => Ok(ValidatedContact {
                name,
                email,
                subject,
                message,
            }),
            _ => Err(DomainError::Validation(violations.join("; "))),
        }
    }
}

fn collect<T>(result: Result<T, DomainError>, violations: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            violations.push(err.detail());
            None
        }
    }
}

/// 新規お問い合わせの作成パラメータ
pub struct NewContactMessage {
    pub id:          ContactMessageId,
    pub contact:     ValidatedContact,
    pub admin_email: String,
    pub now:         DateTime<Utc>,
}

/// 受付済みお問い合わせ（エンティティ）
///
/// # 不変条件
///
/// - 作成時の `email_status` は `Pending`
/// - `email_status` は `Pending` から `Sent` / `Failed` へ一度だけ遷移する
/// - `dispatched_at` / `dispatch_detail` は遷移時にのみ設定される
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    id: ContactMessageId,
    name: ContactName,
    email: Email,
    subject: Subject,
    message: MessageBody,
    created_at: DateTime<Utc>,
    email_status: EmailStatus,
    admin_email: String,
    dispatched_at: Option<DateTime<Utc>>,
    dispatch_detail: Option<String>,
}

/// DB から復元する際のパラメータ
pub struct ContactMessageRecord {
    pub id:              ContactMessageId,
    pub name:            ContactName,
    pub email:           Email,
    pub subject:         Subject,
    pub message:         MessageBody,
    pub created_at:      DateTime<Utc>,
    pub email_status:    EmailStatus,
    pub admin_email:     String,
    pub dispatched_at:   Option<DateTime<Utc>>,
    pub dispatch_detail: Option<String>,
}

impl ContactMessage {
    /// 受付直後のお問い合わせを作成する
    pub fn new(params: NewContactMessage) -> Self {
        let ValidatedContact {
            name,
            email,
            subject,
            message,
        } = params.contact;

        Self {
            id: params.id,
            name,
            email,
            subject,
            message,
            created_at: params.now,
            email_status: EmailStatus::Pending,
            admin_email: params.admin_email,
            dispatched_at: None,
            dispatch_detail: None,
        }
    }

    /// 既存のデータから復元する（データベースから取得時）
    pub fn from_db(record: ContactMessageRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            subject: record.subject,
            message: record.message,
            created_at: record.created_at,
            email_status: record.email_status,
            admin_email: record.admin_email,
            dispatched_at: record.dispatched_at,
            dispatch_detail: record.dispatch_detail,
        }
    }

    pub fn id(&self) -> &ContactMessageId {
        &self.id
    }

    pub fn name(&self) -> &ContactName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn message(&self) -> &MessageBody {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn email_status(&self) -> EmailStatus {
        self.email_status
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub fn dispatched_at(&self) -> Option<DateTime<Utc>> {
        self.dispatched_at
    }

    pub fn dispatch_detail(&self) -> Option<&str> {
        self.dispatch_detail.as_deref()
    }

    /// 送信成功を記録した新しいインスタンスを返す
    pub fn mark_sent(
        self,
        detail: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.record_outcome(EmailStatus::Sent, detail.into(), now)
    }

    /// 送信失敗を記録した新しいインスタンスを返す
    pub fn mark_failed(
        self,
        detail: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.record_outcome(EmailStatus::Failed, detail.into(), now)
    }

    fn record_outcome(
        self,
        status: EmailStatus,
        detail: String,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if self.email_status != EmailStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "送信結果は記録済みです: {} (現在の状態: {})",
                self.id, self.email_status
            )));
        }

        Ok(Self {
            email_status: status,
            dispatched_at: Some(now),
            dispatch_detail: Some(detail),
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn form(name: &str, email: &str, subject: &str, message: &str) -> ContactForm {
        ContactForm {
            name:    Some(name.to_string()),
            email:   Some(email.to_string()),
            subject: Some(subject.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[fixture]
    fn pending_message(now: DateTime<Utc>) -> ContactMessage {
        let contact = form("Ana", "ana@example.com", "Hi", "Test").validate().unwrap();
        ContactMessage::new(NewContactMessage {
            id: ContactMessageId::new(),
            contact,
            admin_email: "contact@aveniq-solutions.com".to_string(),
            now,
        })
    }

    // ===== ContactForm::validate =====

    #[test]
    fn test_正常な入力は本文以外をtrimして検証を通過する() {
        let validated = form("  Ana ", " ana@example.com", " Hi", "  Test\n")
            .validate()
            .unwrap();

        assert_eq!(validated.name.as_str(), "Ana");
        assert_eq!(validated.email.as_str(), "ana@example.com");
        assert_eq!(validated.subject.as_str(), "Hi");
        assert_eq!(validated.message.as_str(), "  Test\n");
    }

    #[test]
    fn test_本文は空白のみなら必須エラーになる() {
        let err = form("Ana", "ana@example.com", "Hi", " \n ").validate().unwrap_err();

        assert_eq!(err, DomainError::Validation("本文は必須です".to_string()));
    }

    #[rstest]
    #[case::名前が空(form("", "ana@example.com", "Hi", "Test"), "名前は必須です")]
    #[case::名前が空白のみ(form("   ", "ana@example.com", "Hi", "Test"), "名前は必須です")]
    #[case::メール形式不正(form("Ana", "not-an-email", "Hi", "Test"), "メールアドレスの形式が不正です")]
    #[case::メールが空(form("Ana", "", "Hi", "Test"), "メールアドレスは必須です")]
    #[case::件名が空(form("Ana", "ana@example.com", "", "Test"), "件名は必須です")]
    #[case::本文が空(form("Ana", "ana@example.com", "Hi", ""), "本文は必須です")]
    fn test_不正な入力はバリデーションエラーになる(
        #[case] input: ContactForm,
        #[case] expected: &str,
    ) {
        let err = input.validate().unwrap_err();

        assert_eq!(err, DomainError::Validation(expected.to_string()));
    }

    #[test]
    fn test_フィールド欠落はすべて必須エラーとして報告される() {
        let err = ContactForm::default().validate().unwrap_err();

        assert_eq!(
            err.detail(),
            "名前は必須です; メールアドレスは必須です; 件名は必須です; 本文は必須です"
        );
    }

    #[test]
    fn test_最大長を超える件名はエラーになる() {
        let long_subject = "あ".repeat(301);

        let err = form("Ana", "ana@example.com", &long_subject, "Test")
            .validate()
            .unwrap_err();

        assert_eq!(err.detail(), "件名は 300 文字以内で入力してください");
    }

    #[test]
    fn test_pii型のdebug出力はマスクされる() {
        let validated = form("Ana", "ana@example.com", "Hi", "秘密の本文")
            .validate()
            .unwrap();

        let debug = format!("{validated:?}");

        assert!(!debug.contains("Ana"));
        assert!(!debug.contains("ana@example.com"));
        assert!(!debug.contains("秘密の本文"));
        assert!(debug.contains("Hi"));
    }

    // ===== EmailStatus =====

    #[rstest]
    #[case(EmailStatus::Pending, "pending")]
    #[case(EmailStatus::Sent, "sent")]
    #[case(EmailStatus::Failed, "failed")]
    fn test_email_statusは小文字の文字列と相互変換できる(
        #[case] status: EmailStatus,
        #[case] text: &str,
    ) {
        assert_eq!(status.to_string(), text);
        assert_eq!(text.parse::<EmailStatus>().unwrap(), status);
        assert_eq!(serde_json::to_value(status).unwrap(), text);
    }

    // ===== ContactMessage =====

    #[rstest]
    fn test_新規作成時はpendingで送信結果を持たない(pending_message: ContactMessage, now: DateTime<Utc>) {
        assert_eq!(pending_message.email_status(), EmailStatus::Pending);
        assert_eq!(pending_message.created_at(), now);
        assert_eq!(pending_message.dispatched_at(), None);
        assert_eq!(pending_message.dispatch_detail(), None);
        assert_eq!(pending_message.admin_email(), "contact@aveniq-solutions.com");
    }

    #[rstest]
    fn test_mark_sentでsentに遷移し結果が記録される(pending_message: ContactMessage, now: DateTime<Utc>) {
        let sent = pending_message
            .mark_sent("Email notification sent to admin", now)
            .unwrap();

        assert_eq!(sent.email_status(), EmailStatus::Sent);
        assert_eq!(sent.dispatched_at(), Some(now));
        assert_eq!(sent.dispatch_detail(), Some("Email notification sent to admin"));
    }

    #[rstest]
    fn test_mark_failedでfailedに遷移する(pending_message: ContactMessage, now: DateTime<Utc>) {
        let failed = pending_message
            .mark_failed("Authentication failed. Check SMTP credentials.", now)
            .unwrap();

        assert_eq!(failed.email_status(), EmailStatus::Failed);
    }

    #[rstest]
    fn test_記録済みのお問い合わせは再遷移できない(pending_message: ContactMessage, now: DateTime<Utc>) {
        let sent = pending_message.mark_sent("ok", now).unwrap();

        let result = sent.mark_failed("late failure", now);

        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
}
