//! # 通知
//!
//! 管理者宛てメール通知のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **fire-and-forget**: 送信失敗はお問い合わせ受付の成否に影響しない
//! - **例外を境界で止める**: [`NotificationError`] は [`DispatchOutcome`] に変換され、
//!   呼び出し元へは伝播しない
//! - **再送なし**: 送信は 1 回のみ試行する

use serde::Serialize;
use thiserror::Error;

/// 送信成功時の詳細メッセージ
pub const SENT_DETAIL: &str = "Email notification sent to admin";

/// メール送信エラー
///
/// `Display` の文字列はそのまま [`DispatchOutcome::detail`] として記録される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// 中継サーバーが認証情報を拒否した
    #[error("Authentication failed. Check SMTP credentials.")]
    AuthenticationFailure,

    /// 認証以外のプロトコルレベルの失敗（接続拒否、タイムアウト、不正な応答）
    #[error("Error sending email: {0}")]
    TransportFailure(String),

    /// 想定外の失敗（宛先アドレスの解析失敗など）
    #[error("Unexpected error: {0}")]
    UnknownFailure(String),
}

impl NotificationError {
    /// ログの `error.kind` に出力する分類名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "authentication_failure",
            Self::TransportFailure(_) => "transport_failure",
            Self::UnknownFailure(_) => "unknown_failure",
        }
    }
}

/// メールメッセージ
///
/// `to` と `from` は同じ運用者メールボックスになる想定。
/// お問い合わせ者のアドレスは本文にのみ含まれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to:        String,
    pub subject:   String,
    pub text_body: String,
}

/// 1 回の送信試行の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    pub detail:  String,
}

impl DispatchOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            detail:  SENT_DETAIL.to_string(),
        }
    }

    pub fn failed(error: &NotificationError) -> Self {
        Self {
            success: false,
            detail:  error.to_string(),
        }
    }
}

impl From<&Result<(), NotificationError>> for DispatchOutcome {
    fn from(result: &Result<(), NotificationError>) -> Self {
        match result {
            Ok(()) => Self::sent(),
            Err(e) => Self::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_送信成功は確認メッセージ付きの成功結果になる() {
        let outcome = DispatchOutcome::from(&Ok::<(), NotificationError>(()));

        assert_eq!(
            outcome,
            DispatchOutcome {
                success: true,
                detail:  "Email notification sent to admin".to_string(),
            }
        );
    }

    #[rstest]
    #[case(
        NotificationError::AuthenticationFailure,
        "Authentication failed. Check SMTP credentials."
    )]
    #[case(
        NotificationError::TransportFailure("connection refused".to_string()),
        "Error sending email: connection refused"
    )]
    #[case(
        NotificationError::UnknownFailure("invalid mailbox".to_string()),
        "Unexpected error: invalid mailbox"
    )]
    fn test_送信エラーは失敗結果の詳細に変換される(
        #[case] error: NotificationError,
        #[case] expected_detail: &str,
    ) {
        let outcome = DispatchOutcome::from(&Err::<(), _>(error));

        assert!(!outcome.success);
        assert_eq!(outcome.detail, expected_detail);
    }
}
