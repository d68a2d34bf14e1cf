//! # お問い合わせハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! POST /api/contact
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Contact form submitted successfully! We'll get back to you soon.",
//!   "contact_id": "019b...."
//! }
//! ```
//!
//! 失敗時は `{ "success": false, "message": ... }` を返す（[`ContactFailure`]）。

use std::sync::Arc;

use aveniq_domain::contact::ContactForm;
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ContactFailure, usecase::ContactUseCaseImpl};

/// お問い合わせ API の State
pub struct ContactState {
    pub usecase: ContactUseCaseImpl,
}

/// 受付成功レスポンス
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success:    bool,
    pub message:    String,
    pub contact_id: Uuid,
}

/// お問い合わせを受け付ける
///
/// ## 処理フロー
/// 1. リクエストボディをパース（失敗時は 400）
/// 2. ユースケースを呼び出し（検証 → 保存 → 通知の予約）
/// 3. 通知の完了を待たずにレスポンスを返す
pub async fn submit_contact(
    State(state): State<Arc<ContactState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactResponse>, ContactFailure> {
    let Json(form) = payload?;

    let receipt = state.usecase.submit(form).await?;

    Ok(Json(ContactResponse {
        success:    true,
        message:    receipt.message.to_string(),
        contact_id: *receipt.contact_id.as_uuid(),
    }))
}
