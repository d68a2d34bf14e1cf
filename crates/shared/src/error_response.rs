//! # RFC 9457 Problem Details
//!
//! `/api/status` などの内部向けエンドポイントが返すエラー本文。
//! axum には依存せず、レスポンスへの変換は各サービスが行う。

use serde::{Deserialize, Serialize};

const ERROR_TYPE_BASE: &str = "https://aveniq-solutions.com/errors";

/// 500 のときの `detail`。内部の失敗理由は含めない
pub const INTERNAL_ERROR_DETAIL: &str = "内部エラーが発生しました";

/// Problem Details の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    BadRequest,
    ValidationError,
    InternalError,
}

impl ProblemKind {
    fn slug(self) -> &'static str {
        match self {
            Self::BadRequest => "bad-request",
            Self::ValidationError => "validation-error",
            Self::InternalError => "internal-error",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::ValidationError => "Validation Error",
            Self::InternalError => "Internal Server Error",
        }
    }

    pub fn status(self) -> u16 {
        match self {
            Self::BadRequest | Self::ValidationError => 400,
            Self::InternalError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 種別を表す URI
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    pub fn of(kind: ProblemKind, detail: impl Into<String>) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{}", kind.slug()),
            title:      kind.title().to_owned(),
            status:     kind.status(),
            detail:     detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::of(ProblemKind::BadRequest, detail)
    }

    pub fn validation_error(detail: impl Into<String>) -> Self {
        Self::of(ProblemKind::ValidationError, detail)
    }

    pub fn internal_error() -> Self {
        Self::of(ProblemKind::InternalError, INTERNAL_ERROR_DETAIL)
    }
}
