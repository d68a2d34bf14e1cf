//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 本番では STARTTLS で暗号化した上で認証し、ローカルの中継サーバー向けには
//! 平文接続（[`SmtpSecurity::None`]）も選択できる。
//!
//! ## エラー分類
//!
//! | lettre の失敗 | 分類 |
//! |---|---|
//! | 恒久エラーの応答コード 530 / 534 / 535 / 538 | `AuthenticationFailure` |
//! | その他の SMTP / 接続 / TLS エラー | `TransportFailure` |
//!
//! 454 は認証の一時失敗にも STARTTLS の拒否（認証情報を送る前）にも使われるため、
//! 認証失敗とはみなさない。
//! | アドレス解析・メッセージ構築の失敗 | `UnknownFailure` |

use async_trait::async_trait;
use aveniq_domain::notification::{EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::{self, authentication::Credentials},
};

use super::NotificationSender;
use crate::error::InfraError;

/// 認証失敗を示す SMTP 応答コード（すべて 5xx）
const AUTH_FAILURE_CODES: [&str; 4] = ["530", "534", "535", "538"];

/// 接続の暗号化方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// 平文で接続後、STARTTLS で TLS にアップグレードする
    #[default]
    StartTls,
    /// 暗号化なし（ローカルの中継サーバー向け）
    None,
}

/// SMTP 接続設定
#[derive(Clone)]
pub struct SmtpSettings {
    pub host:     String,
    pub port:     u16,
    /// 認証アカウント。送信元アドレスとしても使う
    pub username: String,
    pub password: String,
    pub security: SmtpSecurity,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security", &self.security)
            .finish()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// プロセス全体で 1 つ生成し、共有する。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成する
    ///
    /// 接続はメール送信時に確立されるため、ここでは中継サーバーに接続しない。
    pub fn new(settings: SmtpSettings) -> Result<Self, InfraError> {
        let credentials = Credentials::new(settings.username.clone(), settings.password);

        let builder = match settings.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host).map_err(
                    |e| InfraError::unexpected(format!("SMTP トランスポートの構築に失敗: {e}")),
                )?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };

        let transport = builder
            .port(settings.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: settings.username,
        })
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message, NotificationError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| NotificationError::UnknownFailure(format!("invalid sender address: {e}")))?;
        let to: Mailbox = email.to.parse().map_err(|e| {
            NotificationError::UnknownFailure(format!("invalid recipient address: {e}"))
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text_body.clone())
            .map_err(|e| NotificationError::UnknownFailure(e.to_string()))
    }
}

/// lettre の SMTP エラーを分類する
fn classify(err: smtp::Error) -> NotificationError {
    let is_auth_failure = err.is_permanent()
        && err
            .status()
            .map(|code| code.to_string())
            .is_some_and(|code| AUTH_FAILURE_CODES.contains(&code.as_str()));

    if is_auth_failure {
        NotificationError::AuthenticationFailure
    } else {
        NotificationError::TransportFailure(err.to_string())
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;

        self.transport.send(message).await.map_err(classify)?;

        tracing::debug!("SMTP 送信完了");
        Ok(())
    }
}
