//! HTTPクライアント結合テスト
//!
//! tiny_http のスタブバックエンドに対して reqwest クライアントとオーケストレータを検証

use scan_dashboard::client::HttpScanApi;
use scan_dashboard::workflow::{scan_with_progress, select_and_hash};
use scan_dashboard_common::{
    compute_digest, ApiError, ApiHealth, Level, Orchestrator, ScanApi, ScanOutcome, SelectedFile,
};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::tempdir;
use tiny_http::{Header, Response, Server};

const EICAR: &[u8] = br"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";
const EICAR_SHA256: &str = "275a021bbfb6489e54d471899f7db9d1663fc695ec2fe2a2c4538aabf651fd0f";

/// スタブが受け取ったリクエスト
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    url: String,
    content_type: String,
    body: Vec<u8>,
}

type Route = fn(&str, &str) -> (u16, String);

struct StubBackend {
    base_url: String,
    received: Arc<Mutex<Vec<Recorded>>>,
}

impl StubBackend {
    /// エフェメラルポートで起動（スレッドはテスト終了まで動き続ける）
    fn spawn(route: Route) -> Self {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind stub server");
        let addr = server.server_addr().to_ip().expect("Stub server has no IP address");
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);

                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string())
                    .unwrap_or_default();
                let method = request.method().as_str().to_string();
                let url = request.url().to_string();

                let (status, payload) = route(&method, &url);
                log.lock().unwrap().push(Recorded {
                    method,
                    url,
                    content_type,
                    body,
                });

                let response = Response::from_string(payload)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://{}/api", addr),
            received,
        }
    }

    fn api(&self) -> HttpScanApi {
        HttpScanApi::new(&self.base_url, None).unwrap()
    }

    fn requests(&self) -> Vec<Recorded> {
        self.received.lock().unwrap().clone()
    }
}

/// 何も待ち受けていないURL
fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

fn eicar_backend(method: &str, url: &str) -> (u16, String) {
    match (method, url) {
        ("GET", "/api/status") => (
            200,
            r#"{"status":"online","connected":true,"service":"scanner","version":"1.0"}"#.into(),
        ),
        ("POST", "/api/scan") => (
            200,
            format!(
                r#"{{"filename":"eicar.com","hash":"{}","timestamp":"2024-05-01T10:00:00Z",
                    "status":"THREAT_DETECTED",
                    "virustotal":{{"detected":true,"detections":62,"total":70}},
                    "clamav":{{"detected":true,"result":"Eicar-Signature"}}}}"#,
                EICAR_SHA256
            ),
        ),
        ("GET", "/api/history") => (
            200,
            r#"[{"filename":"old.txt","hash":"aa","timestamp":"2024-04-30T09:00:00","status":"CLEAN"},
                {"filename":"bad.exe","hash":"bb","timestamp":"2024-04-30T08:00:00","status":"THREAT_DETECTED",
                 "virustotal":{"detected":true,"detections":5,"total":70}}]"#
                .into(),
        ),
        ("GET", "/api/stats") => (
            200,
            r#"{"success":true,"stats":{"total_scans":12,"threats_found":3,"clean_files":9,"last_scan":"2024-05-01T10:00:00"}}"#.into(),
        ),
        ("GET", "/api/test/eicar") => (
            200,
            format!(
                r#"{{"filename":"eicar_test.txt","hash":"{}","timestamp":"2024-05-01T10:00:00Z",
                    "status":"THREAT_DETECTED","virustotal":{{"detected":true,"detections":60,"total":70}},
                    "clamav":{{"detected":true}}}}"#,
                EICAR_SHA256
            ),
        ),
        _ => (404, r#"{"error":"Not found"}"#.into()),
    }
}

fn failing_backend(_method: &str, _url: &str) -> (u16, String) {
    (500, r#"{"error":"internal"}"#.into())
}

fn html_backend(_method: &str, _url: &str) -> (u16, String) {
    (200, "<html><body>gateway</body></html>".into())
}

fn envelope_history_backend(_method: &str, url: &str) -> (u16, String) {
    match url {
        "/api/history" => (200, r#"{"success":true,"scans":[]}"#.into()),
        _ => (404, "{}".into()),
    }
}

fn null_hash_backend(_method: &str, url: &str) -> (u16, String) {
    match url {
        "/api/scan" => (
            200,
            r#"{"filename":"notes.txt","hash":null,"timestamp":"2024-05-01 10:00","status":"CLEAN"}"#.into(),
        ),
        _ => (404, "{}".into()),
    }
}

fn write_eicar(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("eicar.com");
    std::fs::write(&path, EICAR).unwrap();
    path
}

#[tokio::test]
async fn test_status_online() {
    let backend = StubBackend::spawn(eicar_backend);
    let status = backend.api().status().await.unwrap();

    assert!(status.is_online());
    assert!(status.connected);

    let mut orchestrator = Orchestrator::new(backend.api());
    let health = orchestrator.check_status().await;
    assert_eq!(health, ApiHealth::Online { database_connected: true });

    let notes = orchestrator.notifications_mut().drain();
    assert_eq!(notes[0].message, "System active");
    assert_eq!(notes[1].message, "Backend database: connected");
}

#[tokio::test]
async fn test_eicar_upload_end_to_end() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_eicar(dir.path());

    let backend = StubBackend::spawn(eicar_backend);
    let mut orchestrator = Orchestrator::new(backend.api());

    let hash = select_and_hash(&mut orchestrator, &path).await.unwrap();
    assert_eq!(hash.as_deref(), Some(EICAR_SHA256));

    let outcome = scan_with_progress(&mut orchestrator, false).await.unwrap();
    assert_eq!(outcome, ScanOutcome::Completed);

    // multipart の "file" フィールドで送信されている
    let requests = backend.requests();
    let upload = requests.iter().find(|r| r.url == "/api/scan").unwrap();
    assert_eq!(upload.method, "POST");
    assert!(upload.content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="eicar.com""#));
    assert!(body.contains("EICAR-STANDARD-ANTIVIRUS-TEST-FILE"));

    let latest = orchestrator.store().latest().unwrap();
    assert_eq!(latest.hash, EICAR_SHA256);
    assert!(latest.primary_detected());
    assert_eq!(orchestrator.store().counts().threat, 1);
}

#[tokio::test]
async fn test_http_error_records_failed_result_with_local_hash() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_eicar(dir.path());

    let backend = StubBackend::spawn(failing_backend);
    let mut orchestrator = Orchestrator::new(backend.api());
    select_and_hash(&mut orchestrator, &path).await.unwrap();
    orchestrator.notifications_mut().drain();

    let outcome = scan_with_progress(&mut orchestrator, false).await.unwrap();
    assert_eq!(outcome, ScanOutcome::Failed("HTTP error! status: 500".into()));

    let latest = orchestrator.store().latest().unwrap();
    assert!(latest.is_error());
    assert_eq!(latest.filename, "eicar.com");
    assert_eq!(latest.hash, EICAR_SHA256);

    let notes = orchestrator.notifications_mut().drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, Level::Error);
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let backend = StubBackend::spawn(html_backend);
    let file = SelectedFile::from_bytes("page.txt", b"hello".to_vec());

    let error = backend.api().submit_scan(&file).await.unwrap_err();
    assert!(matches!(error, ApiError::Malformed(_)));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let api = HttpScanApi::new(&unreachable_url(), None).unwrap();
    let mut orchestrator = Orchestrator::new(api);

    let health = orchestrator.check_status().await;
    assert!(!health.is_online());
    let notes = orchestrator.notifications_mut().drain();
    assert_eq!(notes[0].message, "Could not connect to server");

    orchestrator
        .select_file(SelectedFile::from_bytes("eicar.com", EICAR.to_vec()))
        .unwrap();
    let outcome = orchestrator.start_scan().await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Failed(_)));

    let latest = orchestrator.store().latest().unwrap();
    assert!(latest.is_error());
    assert_eq!(latest.hash, "error");
    assert_eq!(orchestrator.store().len(), 1);
}

#[tokio::test]
async fn test_history_array_replaces_store() {
    let backend = StubBackend::spawn(eicar_backend);
    let mut orchestrator = Orchestrator::new(backend.api());

    assert_eq!(orchestrator.load_history().await, Some(2));
    let counts = orchestrator.store().counts();
    assert_eq!(counts.clean, 1);
    assert_eq!(counts.threat, 1);
    assert!(orchestrator.notifications().is_empty());
}

#[tokio::test]
async fn test_history_envelope_is_treated_as_empty() {
    let backend = StubBackend::spawn(envelope_history_backend);
    let mut orchestrator = Orchestrator::new(backend.api());

    assert_eq!(orchestrator.load_history().await, None);
    assert!(orchestrator.store().is_empty());
    assert!(orchestrator.notifications().is_empty());
}

#[tokio::test]
async fn test_stats_envelope() {
    let backend = StubBackend::spawn(eicar_backend);
    let stats = backend.api().stats().await.unwrap();

    assert_eq!(stats.total_scans, 12);
    assert_eq!(stats.threats_found, 3);
    assert_eq!(stats.clean_files, 9);
}

#[tokio::test]
async fn test_backend_eicar_self_test() {
    let backend = StubBackend::spawn(eicar_backend);
    let mut orchestrator = Orchestrator::new(backend.api());

    assert_eq!(orchestrator.run_eicar_check().await, ScanOutcome::Completed);
    let latest = orchestrator.store().latest().unwrap();
    assert_eq!(latest.filename, "eicar_test.txt");
    assert_eq!(latest.hash, compute_digest(EICAR));
}

#[tokio::test]
async fn test_null_hash_in_scan_body_is_still_completed() {
    let backend = StubBackend::spawn(null_hash_backend);
    let mut orchestrator = Orchestrator::new(backend.api());
    orchestrator
        .select_file(SelectedFile::from_bytes("notes.txt", b"notes".to_vec()))
        .unwrap();

    let outcome = orchestrator.start_scan().await.unwrap();
    assert_eq!(outcome, ScanOutcome::Completed);

    let latest = orchestrator.store().latest().unwrap();
    assert!(!latest.is_error());
    assert_eq!(latest.hash, "");
    assert_eq!(orchestrator.store().counts().clean, 1);
}
