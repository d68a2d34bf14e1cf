//! # ドメイン層エラー定義
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `Conflict` | 409 Conflict | 許可されない状態遷移 |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// API 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 複数フィールドの違反は 1 つのメッセージにまとめて格納する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 状態遷移の競合
    ///
    /// 送信結果が既に記録済みのお問い合わせを再度更新しようとした場合など。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}

impl DomainError {
    /// クライアントに返すメッセージ
    ///
    /// `Validation` はプレフィックスなしの詳細のみを返す。
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(detail) | Self::Conflict(detail) => detail.clone(),
        }
    }
}
