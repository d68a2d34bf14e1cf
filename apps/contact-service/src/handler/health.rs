//! # ヘルスチェックハンドラ
//!
//! Contact Service の稼働状態を確認するためのエンドポイント。
//!
//! ## エンドポイント
//!
//! ```text
//! GET /api/          疎通確認（{"message": "Hello World"}）
//! GET /health        Liveness（プロセスが応答できるか）
//! GET /health/ready  Readiness（データベースに接続できるか）
//! ```

use std::{sync::Arc, time::Duration};

use aveniq_shared::{CheckStatus, HealthResponse, ReadinessResponse};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};
use sqlx::PgPool;

/// データベース疎通確認のタイムアウト
const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Readiness Check の State
pub struct ReadinessState {
    pub pool: PgPool,
}

/// API ルートの疎通確認
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check エンドポイント
///
/// データベースへの疎通を確認し、失敗時は 503 を返す。
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let response =
        ReadinessResponse::from_checks([("database", check_database(&state.pool).await)]);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

async fn check_database(pool: &PgPool) -> CheckStatus {
    match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, aveniq_infra::db::ping(pool)).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: database ping failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!("readiness check: database ping timed out");
            CheckStatus::Error
        }
    }
}
