//! # ステータスチェック
//!
//! クライアントが疎通確認のために記録する補助的なエンティティ。
//! お問い合わせの処理とは独立している。

use chrono::{DateTime, Utc};
use serde::Serialize;

define_id! {
    /// ステータスチェック ID
    pub struct StatusCheckId;
}

define_text! {
    /// クライアント名
    pub struct ClientName: "client_name", max 200;
}

/// ステータスチェック（エンティティ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCheck {
    pub id:          StatusCheckId,
    pub client_name: ClientName,
    pub timestamp:   DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(id: StatusCheckId, client_name: ClientName, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_name,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonにはid_client_name_timestampが含まれる() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let check = StatusCheck::new(
            StatusCheckId::new(),
            ClientName::new("uptime-robot").unwrap(),
            now,
        );

        let json = serde_json::to_value(&check).unwrap();

        assert_eq!(json["id"], check.id.to_string());
        assert_eq!(json["client_name"], "uptime-robot");
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_空のクライアント名は拒否される() {
        assert!(ClientName::new("  ").is_err());
    }
}
