//! # Contact Service エラー定義
//!
//! Contact Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## レスポンス形式
//!
//! - `/api/contact`: `{ "success": false, "message": ... }`（[`ContactFailure`]）
//! - その他: RFC 9457 Problem Details（[`ErrorResponse`]）

use aveniq_domain::DomainError;
use aveniq_infra::InfraError;
use aveniq_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// お問い合わせ処理が失敗した場合にクライアントへ返す固定メッセージ
pub const CONTACT_FAILURE_MESSAGE: &str = "Error processing contact form";

/// Contact Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 入力値の検証失敗
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リクエストボディを解釈できない
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(detail) => Self::Validation(detail),
            other @ DomainError::Conflict(_) => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// サーバー側のエラーをログに出力する
    ///
    /// クライアント起因のエラー（4xx）は出力しない。
    fn log(&self) {
        match self {
            Self::Database(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
            }
            Self::Internal(msg) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
            }
            Self::Validation(_) | Self::BadRequest(_) => {}
        }
    }

    /// Problem Details 形式のボディ
    fn problem(&self) -> ErrorResponse {
        match self {
            Self::Validation(detail) => ErrorResponse::validation_error(detail),
            Self::BadRequest(detail) => ErrorResponse::bad_request(detail),
            Self::Database(_) | Self::Internal(_) => ErrorResponse::internal_error(),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.problem())).into_response()
    }
}

/// `/api/contact` の失敗レスポンスボディ
#[derive(Debug, Serialize)]
struct ContactFailureBody {
    success: bool,
    message: String,
}

/// `/api/contact` 用のエラーラッパー
///
/// 4xx は検証メッセージをそのまま返し、5xx は内部情報を隠して
/// [`CONTACT_FAILURE_MESSAGE`] を返す。
#[derive(Debug)]
pub struct ContactFailure(pub CoreError);

impl From<CoreError> for ContactFailure {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ContactFailure {
    fn from(err: DomainError) -> Self {
        Self(err.into())
    }
}

impl From<InfraError> for ContactFailure {
    fn from(err: InfraError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ContactFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.into())
    }
}

impl IntoResponse for ContactFailure {
    fn into_response(self) -> Response {
        let error = self.0;
        error.log();

        let status = error.status_code();
        let message = match error {
            CoreError::Validation(detail) | CoreError::BadRequest(detail) => detail,
            CoreError::Database(_) | CoreError::Internal(_) => CONTACT_FAILURE_MESSAGE.to_string(),
        };

        (
            status,
            Json(ContactFailureBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_検証エラーはproblem_detailsの400になる() {
        let response = CoreError::Validation("client_nameは必須です".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "type": "https://aveniq-solutions.com/errors/validation-error",
                "title": "Validation Error",
                "status": 400,
                "detail": "client_nameは必須です"
            })
        );
    }

    #[tokio::test]
    async fn test_データベースエラーは内部情報を含まない500になる() {
        let error = CoreError::from(InfraError::unexpected("connection reset by peer"));

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "内部エラーが発生しました");
        assert!(!body.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_お問い合わせの検証エラーはsuccess_falseと詳細を返す() {
        let error = ContactFailure::from(DomainError::Validation("名前は必須です".to_string()));

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "名前は必須です" })
        );
    }

    #[tokio::test]
    async fn test_お問い合わせの内部エラーは固定メッセージを返す() {
        let error = ContactFailure::from(InfraError::unexpected("pool timed out"));

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Error processing contact form" })
        );
    }

    #[test]
    fn test_状態遷移の競合は内部エラーとして扱う() {
        let error = CoreError::from(DomainError::Conflict("記録済み".to_string()));

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
