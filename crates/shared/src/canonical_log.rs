//! # Canonical Log Line
//!
//! リクエストが終わるたびに、メソッド・パス・ステータス・処理時間を 1 行にまとめて出す。
//! `TraceLayer` が作るスパンの内側に置くので、この行にも `request_id` が付く。
//!
//! `/health` 配下はロードバランサから定期的に叩かれるため出力しない。

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Request, Response};
use tower::{Layer, Service};

const QUIET_PREFIX: &str = "/health";

#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLine<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLine { inner }
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalLogLine<S> {
    inner: S,
}

/// 1 リクエスト分の記録
struct Summary {
    method:  String,
    path:    String,
    started: Instant,
}

impl Summary {
    fn start<B>(request: &Request<B>) -> Option<Self> {
        let path = request.uri().path();
        if path.starts_with(QUIET_PREFIX) {
            return None;
        }
        Some(Self {
            method:  request.method().to_string(),
            path:    path.to_owned(),
            started: Instant::now(),
        })
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn completed(&self, status: http::StatusCode) {
        tracing::info!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.status_code = status.as_u16(),
            http.latency_ms = self.elapsed_ms(),
            "リクエスト完了"
        );
    }

    fn failed(&self, error: &dyn Display) {
        tracing::error!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.latency_ms = self.elapsed_ms(),
            error.message = %error,
            "リクエスト処理エラー"
        );
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLine<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, S::Error>> + Send>>;
    type Response = Response<ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let summary = Summary::start(&request);
        // ready になったのは self.inner の方なので、そちらを持ち出して代わりに複製を残す
        let ready = self.inner.clone();
        let future = std::mem::replace(&mut self.inner, ready).call(request);

        Box::pin(async move {
            let result = future.await;
            if let Some(summary) = &summary {
                match &result {
                    Ok(response) => summary.completed(response.status()),
                    Err(error) => summary.failed(error),
                }
            }
            result
        })
    }
}
