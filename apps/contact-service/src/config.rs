//! # Contact Service 設定
//!
//! 環境変数から Contact Service サーバーの設定を読み込む。
//!
//! 読み込みは [`ContactServiceConfig::from_lookup`] に集約し、
//! 環境変数の代わりに任意の参照関数を渡せるようにしている（テスト用）。
//! 不正な値はパニックせず [`ConfigError`] として返す。

use std::{env, str::FromStr, time::Duration};

use aveniq_infra::notification::{SmtpSecurity, SmtpSettings};
use axum::http::HeaderValue;
use thiserror::Error;

/// `ADMIN_EMAIL` も `SMTP_SENDER` も未設定の場合の通知先
const DEFAULT_ADMIN_EMAIL: &str = "contact@aveniq-solutions.com";

/// メール本文に埋め込むブランド名のデフォルト
const DEFAULT_BRAND: &str = "Aveniq Solutions";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{name} の値が不正です: {value:?} ({reason})")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Contact Service サーバーの設定
#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// バインドアドレス
    pub host:            String,
    /// ポート番号
    pub port:            u16,
    /// データベース接続 URL
    pub database_url:    String,
    /// 使用する PostgreSQL スキーマ（未設定なら接続先のデフォルト）
    pub database_schema: Option<String>,
    /// 通知設定
    pub notification:    NotificationConfig,
    /// バックグラウンド送信の設定
    pub dispatch:        DispatchConfig,
    /// CORS で許可するオリジン（空なら全オリジンを許可）
    pub cors_origins:    Vec<HeaderValue>,
}

/// 送信バックエンド
///
/// `NOTIFICATION_BACKEND` 環境変数で切り替える:
/// - `smtp`: SMTP 中継サーバー経由で送信（デフォルト）
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub enum NotificationBackend {
    Smtp(SmtpSettings),
    Noop,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:     NotificationBackend,
    /// 通知メールの宛先
    pub admin_email: String,
    /// 本文のヘッダー・フッターに入るブランド名
    pub brand:       String,
}

/// バックグラウンド送信の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// 同時に送信中にできる通知の上限
    pub max_concurrency: usize,
    /// シャットダウン時に送信完了を待つ上限
    pub drain_timeout:   Duration,
}

impl ContactServiceConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 参照関数から設定を読み込む
    ///
    /// 空文字（空白のみを含む）の値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let notification = NotificationConfig::from_lookup(&get)?;

        let max_concurrency: usize = parse_or(&get, "DISPATCH_MAX_CONCURRENCY", 16)?;
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name:   "DISPATCH_MAX_CONCURRENCY",
                value:  "0".to_string(),
                reason: "1 以上を指定してください".to_string(),
            });
        }

        Ok(Self {
            host: get("CONTACT_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "CONTACT_PORT", 8001)?,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            database_schema: get("DATABASE_SCHEMA"),
            notification,
            dispatch: DispatchConfig {
                max_concurrency,
                drain_timeout: Duration::from_secs(parse_or(
                    &get,
                    "DISPATCH_DRAIN_TIMEOUT_SECS",
                    30,
                )?),
            },
            cors_origins: get("CORS_ALLOW_ORIGINS")
                .map(|v| parse_origins(&v))
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

impl NotificationConfig {
    fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_name = get("NOTIFICATION_BACKEND").unwrap_or_else(|| "smtp".to_string());

        let backend = match backend_name.to_ascii_lowercase().as_str() {
            "smtp" => NotificationBackend::Smtp(SmtpSettings {
                host:     get("SMTP_SERVER").ok_or(ConfigError::Missing("SMTP_SERVER"))?,
                port:     parse_or(get, "SMTP_PORT", 587)?,
                username: get("SMTP_SENDER").ok_or(ConfigError::Missing("SMTP_SENDER"))?,
                password: get("SMTP_PASSWORD").ok_or(ConfigError::Missing("SMTP_PASSWORD"))?,
                security: parse_security(get("SMTP_TLS"))?,
            }),
            "noop" => NotificationBackend::Noop,
            _ => {
                return Err(ConfigError::Invalid {
                    name:   "NOTIFICATION_BACKEND",
                    value:  backend_name,
                    reason: "smtp または noop を指定してください".to_string(),
                });
            }
        };

        let admin_email = get("ADMIN_EMAIL")
            .or_else(|| get("SMTP_SENDER"))
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());

        Ok(Self {
            backend,
            admin_email,
            brand: get("NOTIFICATION_BRAND").unwrap_or_else(|| DEFAULT_BRAND.to_string()),
        })
    }
}

fn parse_or<F, T>(get: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_security(value: Option<String>) -> Result<SmtpSecurity, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("starttls") => Ok(SmtpSecurity::StartTls),
        Some("none") => Ok(SmtpSecurity::None),
        Some(_) => Err(ConfigError::Invalid {
            name:   "SMTP_TLS",
            value:  value.unwrap_or_default(),
            reason: "starttls または none を指定してください".to_string(),
        }),
    }
}

/// カンマ区切りのオリジン一覧を解釈する。`*` は全許可（空リスト）を意味する
///
/// ヘッダー値にできないオリジンが 1 つでもあれば起動を止める。
/// 読み飛ばすと、意図せず全オリジンを拒否する設定になりうるため。
fn parse_origins(value: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    let origins: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .collect();

    if origins.contains(&"*") {
        return Ok(Vec::new());
    }

    origins
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name:   "CORS_ALLOW_ORIGINS",
                value:  origin.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
