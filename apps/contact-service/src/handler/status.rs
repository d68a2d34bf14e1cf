//! # ステータスチェックハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! POST /api/status   { "client_name": "..." }
//! GET  /api/status
//! ```

use std::sync::Arc;

use aveniq_domain::status_check::StatusCheck;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;

use crate::{error::CoreError, usecase::StatusCheckUseCaseImpl};

/// ステータスチェック API の State
pub struct StatusState {
    pub usecase: StatusCheckUseCaseImpl,
}

/// ステータスチェック作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateStatusCheckRequest {
    pub client_name: String,
}

/// ステータスチェックを記録する
pub async fn create_status_check(
    State(state): State<Arc<StatusState>>,
    payload: Result<Json<CreateStatusCheckRequest>, JsonRejection>,
) -> Result<Json<StatusCheck>, CoreError> {
    let Json(req) = payload?;

    let check = state.usecase.create(req.client_name).await?;

    Ok(Json(check))
}

/// 最近のステータスチェックを新しい順に返す
pub async fn list_status_checks(
    State(state): State<Arc<StatusState>>,
) -> Result<Json<Vec<StatusCheck>>, CoreError> {
    let checks = state.usecase.list().await?;
    Ok(Json(checks))
}
