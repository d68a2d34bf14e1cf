//! # PostgreSQL データベース接続管理
//!
//! 接続プールの作成、スキーマの準備、マイグレーションの適用、疎通確認を行う。
//!
//! ## 設計方針
//!
//! - **接続プール**: 起動時に一度だけ作成し、アプリケーション全体で共有する
//! - **名前空間**: `DATABASE_SCHEMA` が指定された場合は全コネクションの
//!   `search_path` をそのスキーマに向ける
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use aveniq_infra::db;
//!
//! let pool = db::create_pool("postgres://localhost/aveniq", Some("contact")).await?;
//! db::ensure_schema(&pool, Some("contact")).await?;
//! db::run_migrations(&pool).await?;
//! ```

use std::{str::FromStr, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::error::InfraError;

/// PostgreSQL 接続プールを作成する
///
/// - `max_connections(10)`: 最大接続数
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト。超過時はエラー
///
/// `schema` を指定すると、接続オプションの `search_path` に設定する。
pub async fn create_pool(database_url: &str, schema: Option<&str>) -> Result<PgPool, InfraError> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if let Some(schema) = schema {
        validate_identifier(schema)?;
        options = options.options([("search_path", schema)]);
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// スキーマが存在しなければ作成する
///
/// `schema` が `None` の場合は何もしない（`public` を使用）。
pub async fn ensure_schema(pool: &PgPool, schema: Option<&str>) -> Result<(), InfraError> {
    let Some(schema) = schema else {
        return Ok(());
    };
    validate_identifier(schema)?;

    // 識別子はバインドできないため、検証済みの値を引用符付きで埋め込む
    sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#))
        .execute(pool)
        .await?;

    tracing::info!(schema, "スキーマを準備しました");
    Ok(())
}

/// 埋め込まれたマイグレーションを順番に適用する
///
/// 適用済みのマイグレーションはスキップされる。
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// 疎通確認（Readiness Check 用）
pub async fn ping(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// スキーマ名は英数字とアンダースコアのみ許可する
fn validate_identifier(name: &str) -> Result<(), InfraError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(InfraError::unexpected(format!(
            "スキーマ名が不正です: {name:?}"
        )))
    }
}
