//! ヘルスチェックのレスポンス型

use std::collections::BTreeMap;

use serde::Serialize;

/// Liveness のレスポンス
///
/// ```
/// use aveniq_shared::HealthResponse;
///
/// let response = HealthResponse::healthy("0.1.0");
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status:  &'static str,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy",
            version: version.into(),
        }
    }
}

/// 依存先ごとの確認結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// Readiness のレスポンス
///
/// `checks` はチェック名の昇順で出力される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<&'static str, CheckStatus>,
}

impl ReadinessResponse {
    /// 1 つでも `Error` があれば全体は `NotReady`
    pub fn from_checks(checks: impl IntoIterator<Item = (&'static str, CheckStatus)>) -> Self {
        let checks: BTreeMap<_, _> = checks.into_iter().collect();
        let status = if checks.values().any(|check| *check == CheckStatus::Error) {
            ReadinessStatus::NotReady
        } else {
            ReadinessStatus::Ready
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_healthyはステータスとバージョンを出力する() {
        let json = serde_json::to_value(HealthResponse::healthy("0.1.0")).unwrap();

        assert_eq!(json, json!({ "status": "healthy", "version": "0.1.0" }));
    }

    #[test]
    fn test_すべてokならready() {
        let response = ReadinessResponse::from_checks([("database", CheckStatus::Ok)]);

        assert!(response.is_ready());
    }

    #[test]
    fn test_errorが1つでもあればnot_readyとして出力する() {
        let response = ReadinessResponse::from_checks([
            ("smtp", CheckStatus::Ok),
            ("database", CheckStatus::Error),
        ]);

        assert!(!response.is_ready());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "not_ready",
                "checks": { "database": "error", "smtp": "ok" }
            })
        );
    }
}
