//! # Contact Service サーバー
//!
//! Web サイトのお問い合わせフォームを受け付けるサービス。
//!
//! ## 役割
//!
//! - **受付**: 入力を検証し、PostgreSQL に `pending` 状態で保存する
//! - **通知**: 保存後、管理者宛てのメールをバックグラウンドで 1 回だけ送信する
//! - **結果記録**: 送信結果に応じて `email_status` を `sent` / `failed` に更新する
//!
//! ```text
//! POST /api/contact ──▶ 検証 ──▶ 保存 ──▶ 200 応答
//!                                  │
//!                                  └──▶ (バックグラウンド) SMTP 送信 ──▶ 送信結果の記録
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CONTACT_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CONTACT_PORT` | No | ポート番号（デフォルト: `8001`） |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `DATABASE_SCHEMA` | No | 使用するスキーマ（未作成なら作成する） |
//! | `NOTIFICATION_BACKEND` | No | `smtp`（デフォルト）または `noop` |
//! | `SMTP_SERVER` / `SMTP_SENDER` / `SMTP_PASSWORD` | smtp 時 | 中継サーバーと認証情報 |
//! | `SMTP_PORT` | No | 中継サーバーのポート（デフォルト: `587`） |
//! | `SMTP_TLS` | No | `starttls`（デフォルト）または `none` |
//! | `ADMIN_EMAIL` | No | 通知先（デフォルト: `SMTP_SENDER`） |
//! | `NOTIFICATION_BRAND` | No | 本文に入るブランド名 |
//! | `DISPATCH_MAX_CONCURRENCY` | No | 同時送信数の上限（デフォルト: `16`） |
//! | `DISPATCH_DRAIN_TIMEOUT_SECS` | No | 終了時に送信完了を待つ秒数（デフォルト: `30`） |
//! | `CORS_ALLOW_ORIGINS` | No | 許可するオリジン（カンマ区切り、デフォルト: `*`） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（メールは送信せずログ出力のみ）
//! NOTIFICATION_BACKEND=noop DATABASE_URL=postgres://... cargo run -p aveniq-contact-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use aveniq_contact_service::{
    app_builder::{AppState, build_app},
    config::{ContactServiceConfig, NotificationBackend},
    handler::{ContactState, ReadinessState, StatusState},
    usecase::{
        ContactUseCaseImpl,
        StatusCheckUseCaseImpl,
        notification::{BackgroundDispatcher, NotificationService},
    },
};
use aveniq_domain::clock::{Clock, SystemClock};
use aveniq_infra::{
    db,
    notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender},
    repository::{
        ContactMessageRepository,
        PostgresContactMessageRepository,
        PostgresStatusCheckRepository,
    },
};
use aveniq_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Contact Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(TracingConfig::from_env("contact-service"));
    let _tracing_guard = tracing::info_span!("app", service = "contact-service").entered();

    // 設定読み込み
    let config = ContactServiceConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Contact Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url, config.database_schema.as_deref())
        .await
        .context("データベース接続に失敗しました")?;
    db::ensure_schema(&pool, config.database_schema.as_deref())
        .await
        .context("スキーマの作成に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 依存コンポーネントを初期化
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let contact_repo: Arc<dyn ContactMessageRepository> =
        Arc::new(PostgresContactMessageRepository::new(pool.clone()));

    let sender: Arc<dyn NotificationSender> = match &config.notification.backend {
        NotificationBackend::Smtp(settings) => {
            tracing::info!(
                host = %settings.host,
                port = settings.port,
                "SMTP で通知を送信します"
            );
            Arc::new(
                SmtpNotificationSender::new(settings.clone())
                    .context("SMTP 送信の初期化に失敗しました")?,
            )
        }
        NotificationBackend::Noop => {
            tracing::warn!("NOTIFICATION_BACKEND=noop のため通知メールは送信されません");
            Arc::new(NoopNotificationSender)
        }
    };

    let notification_service = Arc::new(NotificationService::new(
        sender,
        contact_repo.clone(),
        clock.clone(),
        config.notification.brand.clone(),
    ));
    let dispatcher = Arc::new(BackgroundDispatcher::new(
        notification_service,
        config.dispatch.max_concurrency,
    ));

    let state = AppState {
        contact:   Arc::new(ContactState {
            usecase: ContactUseCaseImpl::new(
                contact_repo,
                dispatcher.clone(),
                clock.clone(),
                config.notification.admin_email.clone(),
            ),
        }),
        status:    Arc::new(StatusState {
            usecase: StatusCheckUseCaseImpl::new(
                Arc::new(PostgresStatusCheckRepository::new(pool.clone())),
                clock,
            ),
        }),
        readiness: Arc::new(ReadinessState { pool: pool.clone() }),
    };

    // ルーター構築
    let app = build_app(state, &config.cors_origins);

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Contact Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 送信中の通知を待ってからプールを閉じる
    tracing::info!(
        in_flight = dispatcher.in_flight(),
        "送信中の通知の完了を待ちます"
    );
    if !dispatcher.drain(config.dispatch.drain_timeout).await {
        tracing::warn!(
            in_flight = dispatcher.in_flight(),
            "時間内に完了しなかった通知があります"
        );
    }

    pool.close().await;
    tracing::info!("シャットダウンが完了しました");

    Ok(())
}

/// Ctrl+C または SIGTERM を待つ
///
/// シグナルハンドラの登録に失敗した場合はログを出力し、そのシグナルは待たない。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C ハンドラの登録に失敗しました");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗しました");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl+C を受信しました"),
        () = terminate => tracing::info!("SIGTERM を受信しました"),
    }

    tracing::info!("グレースフルシャットダウンを開始します");
}
