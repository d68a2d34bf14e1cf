//! # トレーシングとリクエスト ID
//!
//! - [`init_tracing`]: グローバル subscriber の登録（`LOG_FORMAT` で JSON / Pretty を選ぶ）
//! - [`MakeRequestUuidV7`] / [`make_request_span`]: HTTP リクエストごとの ID とスパン
//!
//! subscriber を登録する部分は `observability` feature を有効にしたときだけ使える。

/// リクエスト ID を運ぶヘッダー
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 未設定時のフィルタ
#[cfg(feature = "observability")]
const DEFAULT_FILTER: &str = "info,aveniq=debug";

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 JSON。ログ基盤に取り込む環境向け
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// `LOG_FORMAT` の値を解釈する
    ///
    /// 大文字小文字と前後の空白は無視する。未知の値は `Pretty` として扱い、
    /// subscriber がまだないため標準エラーに直接警告を書く。
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "" | "pretty" => Self::Pretty,
            _ => {
                eprintln!("WARNING: LOG_FORMAT={value:?} は未対応のため pretty で出力します");
                Self::Pretty
            }
        }
    }
}

/// [`init_tracing`] に渡す設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        let log_format = std::env::var("LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Self::new(service_name, log_format)
    }
}

/// グローバル subscriber を登録する
///
/// フィルタは `RUST_LOG`、未設定なら `info,aveniq=debug`。
/// `tracing_error::ErrorLayer` も積むので、エラー生成時の `SpanTrace` にスパン名が残る。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let output = if config.log_format == LogFormat::Json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::debug!(
        service = %config.service_name,
        format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}

/// リクエスト ID を UUID v7 で採番する
///
/// クライアントが `x-request-id` を付けてきた場合は `SetRequestIdLayer` がそれを使い、
/// これは呼ばれない。
#[cfg(feature = "observability")]
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(
        &mut self,
        _request: &http::Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        let value = http::HeaderValue::try_from(uuid::Uuid::now_v7().to_string()).ok()?;
        Some(tower_http::request_id::RequestId::new(value))
    }
}

/// `TraceLayer::make_span_with` 用のスパン
///
/// 配下のログすべてに `request_id` が付く。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_log_formatは大文字小文字と空白を無視して解釈する() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
    }

    #[test]
    fn test_未知のlog_formatはprettyになる() {
        assert_eq!(LogFormat::parse("yaml"), LogFormat::Pretty);
    }

    #[cfg(feature = "observability")]
    #[test]
    fn test_採番したリクエストidはuuid_v7() {
        use tower_http::request_id::MakeRequestId as _;

        let request = http::Request::new(());
        let id = MakeRequestUuidV7.make_request_id(&request).unwrap();

        let parsed = uuid::Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[cfg(feature = "observability")]
    #[test]
    fn test_リクエストスパンはrequestという名前で作られる() {
        let subscriber = tracing_subscriber::registry();
        tracing::subscriber::with_default(subscriber, || {
            let request = http::Request::builder()
                .uri("/api/status?limit=5")
                .header(REQUEST_ID_HEADER, "req-1")
                .body(())
                .unwrap();

            let span = make_request_span(&request);

            assert_eq!(span.metadata().map(|m| m.name()), Some("request"));
        });
    }
}
