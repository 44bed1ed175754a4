//! スキャン結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - ScanResult: バックエンド（またはローカルの失敗時）が生成する1件の結果
//! - PrimaryEngine / SecondaryEngine: エンジン別の判定
//! - BackendStatus / BackendStats: ステータス・統計エンドポイントの応答

use chrono::{
    DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 失敗時にハッシュが未計算の場合のセンチネル
pub const HASH_SENTINEL: &str = "error";

/// 失敗時にセカンダリエンジンへ設定する説明
pub const NOT_SCANNED: &str = "Not scanned";

/// プライマリエンジンの総数が不明な場合の既定値
pub const DEFAULT_ENGINE_TOTAL: u32 = 70;

/// スキャンステータス
///
/// 大文字小文字を区別せずに解釈する。`THREAT_DETECTED` は malicious として扱い、
/// 未知の値はそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScanStatus {
    Clean,
    Suspicious,
    Malicious,
    Error,
    Other(String),
}

impl From<String> for ScanStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "clean" => ScanStatus::Clean,
            "suspicious" => ScanStatus::Suspicious,
            "malicious" | "threat_detected" => ScanStatus::Malicious,
            "error" => ScanStatus::Error,
            _ => ScanStatus::Other(value),
        }
    }
}

impl From<ScanStatus> for String {
    fn from(status: ScanStatus) -> Self {
        match status {
            ScanStatus::Clean => "clean".to_string(),
            ScanStatus::Suspicious => "suspicious".to_string(),
            ScanStatus::Malicious => "malicious".to_string(),
            ScanStatus::Error => "error".to_string(),
            ScanStatus::Other(value) => value,
        }
    }
}

/// プライマリエンジン（検出数/総数形式）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryEngine {
    #[serde(default)]
    pub detected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// engines など、バックエンド固有のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// セカンダリエンジン（二値判定）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryEngine {
    #[serde(default)]
    pub detected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// スキャン結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filename: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub hash: String,

    /// ISO-8601。欠落・不正な場合は集計対象外
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScanStatus>,

    #[serde(default, alias = "virustotal", skip_serializing_if = "Option::is_none")]
    pub primary_engine: Option<PrimaryEngine>,

    #[serde(default, alias = "clamav", skip_serializing_if = "Option::is_none")]
    pub secondary_engine: Option<SecondaryEngine>,

    /// size, postgresql_id など、その他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanResult {
    /// スキャン失敗を表す結果を生成
    pub fn failed(filename: &str, hash: Option<&str>, cause: &str, at: DateTime<Utc>) -> Self {
        Self {
            filename: filename.to_string(),
            hash: hash.unwrap_or(HASH_SENTINEL).to_string(),
            timestamp: Some(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            status: Some(ScanStatus::Error),
            primary_engine: Some(PrimaryEngine {
                detected: false,
                error: Some(cause.to_string()),
                ..Default::default()
            }),
            secondary_engine: Some(SecondaryEngine {
                detected: false,
                error: Some(NOT_SCANNED.to_string()),
                ..Default::default()
            }),
            extra: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Some(ScanStatus::Error))
    }

    pub fn is_suspicious(&self) -> bool {
        matches!(self.status, Some(ScanStatus::Suspicious))
    }

    pub fn primary_detected(&self) -> bool {
        self.primary_engine.as_ref().is_some_and(|e| e.detected)
    }

    pub fn secondary_detected(&self) -> bool {
        self.secondary_engine.as_ref().is_some_and(|e| e.detected)
    }

    /// いずれかのエンジンが検出したか
    pub fn any_engine_detected(&self) -> bool {
        self.primary_detected() || self.secondary_detected()
    }

    /// プライマリエンジンの表示（"検出数/総数"、エラー時は "Error"）
    pub fn primary_summary(&self) -> String {
        match &self.primary_engine {
            Some(engine) if engine.error.is_some() => "Error".to_string(),
            Some(engine) => format!(
                "{}/{}",
                engine.detections.unwrap_or(0),
                engine.total.unwrap_or(DEFAULT_ENGINE_TOTAL)
            ),
            None => format!("0/{}", DEFAULT_ENGINE_TOTAL),
        }
    }

    /// セカンダリエンジンの表示
    pub fn secondary_summary(&self) -> String {
        match &self.secondary_engine {
            Some(engine) if engine.detected => "Detected".to_string(),
            Some(engine) => engine.error.clone().unwrap_or_else(|| "Clean".to_string()),
            None => "Clean".to_string(),
        }
    }

    /// 表示用の時刻（HH:MM:SS、解釈できなければ "--:--:--"）
    pub fn time_label(&self) -> String {
        self.parsed_timestamp()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string())
    }

    /// タイムスタンプをローカル時刻として解釈
    pub fn parsed_timestamp(&self) -> Option<DateTime<Local>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    /// 集計に使える結果か（タイムスタンプが有効）
    pub fn is_well_formed(&self) -> bool {
        self.parsed_timestamp().is_some()
    }
}

/// `null` を空文字列として読む
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// タイムゾーンなしで受け付ける日時の形式（ローカル時刻とみなす）
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// ISO-8601文字列をパース
///
/// RFC 3339（タイムゾーン付き）、タイムゾーンなしの日時（秒・分精度、
/// 区切りは `T` または空白）、日付のみ（UTCの0時）を受け付ける。
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(local_from_naive(&naive));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// ローカル時刻として解釈（夏時間の欠落区間はUTCとして扱う）
fn local_from_naive(naive: &NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => Utc.from_utc_datetime(naive).with_timezone(&Local),
    }
}

/// `GET /api/status` の応答
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub status: String,

    /// バックエンドのデータベース接続（falseはデモモード）
    #[serde(default)]
    pub connected: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl BackendStatus {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// `GET /api/stats` の統計値
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendStats {
    pub total_scans: u64,
    pub threats_found: u64,
    pub clean_files: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<String>,
}

impl BackendStats {
    /// `{ "success": true, "stats": {...} }` 形式、または統計オブジェクト単体を解釈
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(mut map) if map.contains_key("stats") => {
                let inner = map.remove("stats").unwrap_or(Value::Null);
                serde_json::from_value(inner)
            }
            other => serde_json::from_value(other),
        }
    }
}

/// ステータスチェックの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiHealth {
    Online { database_connected: bool },
    Offline { reason: String },
}

impl ApiHealth {
    pub fn is_online(&self) -> bool {
        matches!(self, ApiHealth::Online { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!(ScanStatus::from("CLEAN".to_string()), ScanStatus::Clean);
        assert_eq!(ScanStatus::from("ERROR".to_string()), ScanStatus::Error);
        assert_eq!(ScanStatus::from("THREAT_DETECTED".to_string()), ScanStatus::Malicious);
        assert_eq!(ScanStatus::from("suspicious".to_string()), ScanStatus::Suspicious);
        assert_eq!(
            ScanStatus::from("quarantined".to_string()),
            ScanStatus::Other("quarantined".to_string())
        );
    }

    #[test]
    fn test_deserialize_backend_engine_aliases() {
        let value = json!({
            "filename": "setup.exe",
            "hash": "ab".repeat(32),
            "size": 2048,
            "timestamp": "2024-05-01T10:00:00.123456",
            "status": "THREAT_DETECTED",
            "virustotal": {"detected": true, "detections": 4, "total": 70, "engines": {"DemoAV": "Trojan.Generic"}},
            "clamav": {"detected": false, "result": "OK"}
        });

        let result: ScanResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.filename, "setup.exe");
        assert_eq!(result.status, Some(ScanStatus::Malicious));
        assert!(result.primary_detected());
        assert!(!result.secondary_detected());
        assert_eq!(result.primary_engine.as_ref().unwrap().detections, Some(4));
        assert_eq!(result.extra.get("size"), Some(&json!(2048)));
        assert_eq!(
            result.secondary_engine.as_ref().unwrap().extra.get("result"),
            Some(&json!("OK"))
        );
        assert!(result.is_well_formed());
    }

    #[test]
    fn test_serialize_uses_canonical_names() {
        let result = ScanResult {
            filename: "a.txt".into(),
            hash: "00".repeat(32),
            timestamp: Some("2024-05-01T10:00:00Z".into()),
            status: Some(ScanStatus::Clean),
            primary_engine: Some(PrimaryEngine::default()),
            secondary_engine: None,
            extra: Map::new(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], json!("clean"));
        assert!(value.get("primaryEngine").is_some());
        assert!(value.get("secondaryEngine").is_none());
        assert!(value["primaryEngine"].get("detections").is_none());
    }

    #[test]
    fn test_failed_result_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let result = ScanResult::failed("doc.pdf", None, "Failed to fetch", at);

        assert!(result.is_error());
        assert_eq!(result.hash, HASH_SENTINEL);
        assert_eq!(result.timestamp.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(
            result.primary_engine.as_ref().unwrap().error.as_deref(),
            Some("Failed to fetch")
        );
        assert_eq!(
            result.secondary_engine.as_ref().unwrap().error.as_deref(),
            Some(NOT_SCANNED)
        );
        assert!(!result.any_engine_detected());
    }

    #[test]
    fn test_primary_summary_variants() {
        let mut result = ScanResult::default();
        assert_eq!(result.primary_summary(), "0/70");

        result.primary_engine = Some(PrimaryEngine {
            detected: true,
            detections: Some(12),
            total: Some(68),
            ..Default::default()
        });
        assert_eq!(result.primary_summary(), "12/68");

        result.primary_engine = Some(PrimaryEngine {
            error: Some("quota exceeded".into()),
            ..Default::default()
        });
        assert_eq!(result.primary_summary(), "Error");
    }

    #[test]
    fn test_secondary_summary_variants() {
        let mut result = ScanResult::default();
        assert_eq!(result.secondary_summary(), "Clean");

        result.secondary_engine = Some(SecondaryEngine {
            detected: true,
            ..Default::default()
        });
        assert_eq!(result.secondary_summary(), "Detected");

        result.secondary_engine = Some(SecondaryEngine {
            error: Some(NOT_SCANNED.into()),
            ..Default::default()
        });
        assert_eq!(result.secondary_summary(), NOT_SCANNED);
    }

    #[test]
    fn test_time_label_fallback() {
        let mut result = ScanResult::default();
        assert_eq!(result.time_label(), "--:--:--");

        result.timestamp = Some("2024-05-01T10:15:30".into());
        assert_eq!(result.time_label(), "10:15:30");
    }

    #[test]
    fn test_missing_or_invalid_timestamp_is_malformed() {
        let mut result = ScanResult::default();
        assert!(!result.is_well_formed());

        result.timestamp = Some("yesterday".into());
        assert!(!result.is_well_formed());

        result.timestamp = Some("2024-05-01T10:00:00+03:00".into());
        assert!(result.is_well_formed());
    }

    #[test]
    fn test_timestamp_accepts_iso_variants() {
        for raw in [
            "2024-05-01",
            "2024-05-01T10:00",
            "2024-05-01 10:00",
            "2024-05-01 10:00:00",
            "2024-05-01 10:00:00.250",
            "2024-05-01T10:00:00.123456",
            "2024-05-01T10:00:00Z",
        ] {
            assert!(parse_timestamp(raw).is_some(), "rejected {}", raw);
        }

        assert!(parse_timestamp("2024-13-01").is_none());
        assert!(parse_timestamp("2024-05-01T25:00").is_none());
    }

    #[test]
    fn test_minute_precision_time_label() {
        let result = ScanResult {
            timestamp: Some("2024-05-01 10:15".into()),
            ..Default::default()
        };
        assert_eq!(result.time_label(), "10:15:00");
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        let parsed = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(
            parsed.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true),
            "2024-05-01T00:00:00Z"
        );
    }

    #[test]
    fn test_naive_time_in_any_zone_resolves() {
        // 欠落区間でも None にはならない
        let naive = NaiveDate::from_ymd_opt(2024, 3, 31)
            .and_then(|d| d.and_hms_opt(2, 30, 0))
            .unwrap();
        let local = local_from_naive(&naive);
        assert!((local.naive_local() - naive).num_hours().abs() <= 24);
    }

    #[test]
    fn test_null_hash_and_filename_read_as_empty() {
        let result: ScanResult = serde_json::from_value(json!({
            "filename": null,
            "hash": null,
            "timestamp": "2024-05-01T10:00:00Z",
            "status": "CLEAN"
        }))
        .unwrap();

        assert_eq!(result.hash, "");
        assert_eq!(result.filename, "");
        assert!(result.is_well_formed());
    }

    #[test]
    fn test_backend_stats_envelope_and_bare() {
        let wrapped = json!({
            "success": true,
            "database": "PostgreSQL",
            "stats": {"total_scans": 12, "threats_found": 3, "clean_files": 9, "last_scan": null}
        });
        let stats = BackendStats::from_value(wrapped).unwrap();
        assert_eq!(stats.total_scans, 12);
        assert_eq!(stats.threats_found, 3);
        assert!(stats.last_scan.is_none());

        let bare = json!({"total_scans": 1});
        let stats = BackendStats::from_value(bare).unwrap();
        assert_eq!(stats.total_scans, 1);
        assert_eq!(stats.clean_files, 0);
    }

    #[test]
    fn test_backend_status_online() {
        let status: BackendStatus =
            serde_json::from_value(json!({"status": "online", "connected": false})).unwrap();
        assert!(status.is_online());
        assert!(!status.connected);

        let status: BackendStatus = serde_json::from_value(json!({"status": "maintenance"})).unwrap();
        assert!(!status.is_online());
    }
}
