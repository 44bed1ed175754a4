//! バックエンドAPIの契約
//!
//! - GET  /api/status      → BackendStatus
//! - POST /api/scan        → ScanResult（multipart, フィールド名 `file`）
//! - GET  /api/history     → ScanResult の配列
//! - GET  /api/stats       → BackendStats
//! - GET  /api/test/eicar  → ScanResult（バックエンド側のEICAR自己診断）
//!
//! 実装はCLI（reqwest）とWeb（fetch）がそれぞれ持つ。

use crate::error::ApiError;
use crate::file::SelectedFile;
use crate::types::{BackendStats, BackendStatus, ScanResult};
use serde_json::Value;

/// 既定のAPIベースURL
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// スキャンAPIクライアント
///
/// WASMでも使うため `Send` は要求しない。
#[allow(async_fn_in_trait)]
pub trait ScanApi {
    async fn status(&self) -> Result<BackendStatus, ApiError>;

    async fn submit_scan(&self, file: &SelectedFile) -> Result<ScanResult, ApiError>;

    /// 履歴は配列以外も返りうるため、生のJSONで受け取る
    async fn history(&self) -> Result<Value, ApiError>;

    async fn stats(&self) -> Result<BackendStats, ApiError>;

    async fn eicar_test(&self) -> Result<ScanResult, ApiError>;
}

/// 履歴レスポンスを解釈
///
/// 配列でなければ `None`（履歴なし扱い）。配列の要素のうち
/// ScanResult として読めないものは読み飛ばす。
pub fn parse_history(value: Value) -> Option<Vec<ScanResult>> {
    let Value::Array(items) = value else {
        return None;
    };

    let results = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<ScanResult>(item) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable history entry");
                None
            }
        })
        .collect();

    Some(results)
}

/// エンドポイントURLを組み立てる
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_history_empty_array() {
        assert_eq!(parse_history(json!([])), Some(Vec::new()));
    }

    #[test]
    fn test_parse_history_non_array() {
        assert!(parse_history(json!({"success": true, "scans": []})).is_none());
        assert!(parse_history(Value::Null).is_none());
        assert!(parse_history(json!("nope")).is_none());
    }

    #[test]
    fn test_parse_history_skips_unreadable_entries() {
        let value = json!([
            {"filename": "a.txt", "hash": "aa", "timestamp": "2024-05-01T10:00:00Z"},
            42,
            {"filename": "b.txt", "timestamp": null}
        ]);

        let results = parse_history(value).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].filename, "a.txt");
        assert_eq!(results[1].filename, "b.txt");
        assert!(!results[1].is_well_formed());
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        assert_eq!(endpoint("http://localhost:5000/api", "scan"), "http://localhost:5000/api/scan");
        assert_eq!(endpoint("http://host/api/", "/status"), "http://host/api/status");
    }
}
