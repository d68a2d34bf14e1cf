//! # アプリケーション構築
//!
//! State を受け取り、ルーターとミドルウェアを組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use aveniq_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{
    ContactState,
    ReadinessState,
    StatusState,
    create_status_check,
    health_check,
    list_status_checks,
    readiness_check,
    root,
    submit_contact,
};

/// ルーターに注入する State 一式
#[derive(Clone)]
pub struct AppState {
    pub contact:   Arc<ContactState>,
    pub status:    Arc<StatusState>,
    pub readiness: Arc<ReadinessState>,
}

/// ルーターを構築する
///
/// `cors_origins` が空の場合は全オリジンを許可する。
pub fn build_app(state: AppState, cors_origins: &[HeaderValue]) -> Router {
    let contact_routes = Router::new()
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/contact", post(submit_contact))
        .with_state(state.contact);

    let status_routes = Router::new()
        .route(
            "/api/status",
            post(create_status_check).get(list_status_checks),
        )
        .with_state(state.status);

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(state.readiness);

    // レイヤーは下から順に外側になる:
    // SetRequestId → TraceLayer（スパン作成）→ CanonicalLogLine → PropagateRequestId → CORS → handler
    Router::new()
        .merge(contact_routes)
        .merge(status_routes)
        .merge(health_routes)
        .layer(cors_layer(cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins.iter().cloned()))
    }
}
