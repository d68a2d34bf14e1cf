//! # インフラ層エラー
//!
//! PostgreSQL とのやり取りで失敗したときのエラー。
//!
//! 種別（[`InfraErrorKind`]）と、生成した時点の [`SpanTrace`] を組にして持つ。
//! どのコンストラクタを通っても [`InfraErrorKind`] からの変換に集約されるため、
//! 呼び出し経路の記録が漏れることはない。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// 種別で分岐するときは [`kind()`](InfraError::kind) を使う。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    #[error("マイグレーションエラー: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// 条件付き UPDATE の対象行がなかった（送信結果を記録済みなど）
    #[error("競合が発生しました: {entity}(id={id})")]
    Conflict { entity: String, id: String },

    /// 保存値がドメインの制約を満たさないなど、分類できないもの
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        InfraErrorKind::Database(source).into()
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        InfraErrorKind::Migration(source).into()
    }
}

impl InfraError {
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        InfraErrorKind::Conflict {
            entity: entity.into(),
            id:     id.into(),
        }
        .into()
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        InfraErrorKind::Unexpected(msg.into()).into()
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 競合の場合のみ `(entity, id)` を返す
    pub fn as_conflict(&self) -> Option<(&str, &str)> {
        if let InfraErrorKind::Conflict { entity, id } = &self.kind {
            Some((entity.as_str(), id.as_str()))
        } else {
            None
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if f.alternate() {
            write!(f, "\n{}", self.span_trace)?;
        }
        Ok(())
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}
