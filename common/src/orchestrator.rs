//! アップロード・スキャンのオーケストレーション
//!
//! ファイル選択 → ダイジェスト計算 → 送信 → 結果反映 の流れを管理する。
//!
//! 状態遷移:
//! - Idle → FileSelected → HashComputing → HashReady → Scanning
//! - 失敗時は FileRejected / HashFailed / ScanFailed を記録し、選択中のファイルは保持したまま戻る
//!
//! 開始処理（begin_*）と完了処理（finish_*）を分けているので、
//! 呼び出し側は状態を借用したまま `.await` せずに済む（Webの `Rc<RefCell<_>>` 向け）。

use crate::api::{parse_history, ScanApi};
use crate::digest::digest_file;
use crate::error::{ApiError, DigestError, OrchestratorError, Result};
use crate::file::{format_file_size, SelectedFile, MAX_FILE_SIZE};
use crate::notify::{Level, NotificationCenter};
use crate::session::SessionState;
use crate::store::ResultStore;
use crate::types::{ApiHealth, BackendStatus, ScanResult};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

/// バックエンド自己診断の結果に使うファイル名
pub const EICAR_TEST_NAME: &str = "eicar_test.txt";

/// 現在のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    HashComputing,
    HashReady,
    Scanning,
}

/// 直近の終端遷移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    FileRejected,
    HashFailed,
    Completed,
    ScanFailed,
}

/// スキャン試行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    Failed(String),
    /// 既に送信中のため無視した
    Ignored,
}

/// ダイジェスト計算の対象（選択時点のファイルを保持）
#[derive(Debug, Clone)]
pub struct DigestTicket {
    selection_id: u64,
    file: SelectedFile,
}

impl DigestTicket {
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn compute(&self) -> std::result::Result<String, DigestError> {
        digest_file(&self.file)
    }
}

/// 送信中のスキャン
#[derive(Debug, Clone)]
pub struct ScanTicket {
    selection_id: u64,
    filename: String,
    hash: Option<String>,
    file: Option<SelectedFile>,
}

impl ScanTicket {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }
}

pub struct Orchestrator<A> {
    api: A,
    session: SessionState,
    store: ResultStore,
    notifications: NotificationCenter,
    digest_pending: Option<u64>,
    scan_in_flight: bool,
    last_transition: Option<Transition>,
}

impl<A: ScanApi> Orchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: SessionState::new(),
            store: ResultStore::new(),
            notifications: NotificationCenter::new(),
            digest_pending: None,
            scan_in_flight: false,
            last_transition: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_in_flight
    }

    /// スキャンボタンを有効にできるか
    pub fn can_start_scan(&self) -> bool {
        self.session.selected_file().is_some() && !self.scan_in_flight
    }

    pub fn phase(&self) -> Phase {
        if self.scan_in_flight {
            Phase::Scanning
        } else if self.digest_pending == Some(self.session.selection_id()) {
            Phase::HashComputing
        } else if self.session.selected_file_hash().is_some() {
            Phase::HashReady
        } else if self.session.selected_file().is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    // =============================================
    // ファイル選択
    // =============================================

    /// サイズ上限チェック（超過時は警告を出し、状態は変えない）
    pub fn validate_size(&mut self, name: &str, size: u64) -> Result<()> {
        if size <= MAX_FILE_SIZE {
            return Ok(());
        }

        warn!(file = name, size, limit = MAX_FILE_SIZE, "file rejected: too large");
        self.last_transition = Some(Transition::FileRejected);
        self.notifications.push(
            Level::Warning,
            format!(
                "File is too large: {} (max {})",
                format_file_size(size),
                format_file_size(MAX_FILE_SIZE)
            ),
        );
        Err(OrchestratorError::FileTooLarge {
            name: name.to_string(),
            size,
        })
    }

    pub fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        self.validate_size(file.name(), file.size())?;

        info!(file = file.name(), size = file.size(), "file selected");
        self.notifications
            .push(Level::Success, format!("File \"{}\" loaded", file.name()));
        self.session.select(file);
        Ok(())
    }

    // =============================================
    // ダイジェスト
    // =============================================

    pub fn begin_digest(&mut self) -> Option<DigestTicket> {
        let file = self.session.selected_file()?.clone();
        let selection_id = self.session.selection_id();

        self.digest_pending = Some(selection_id);
        self.notifications.push(Level::Info, "Computing SHA-256 digest...");
        Some(DigestTicket { selection_id, file })
    }

    pub fn finish_digest(
        &mut self,
        ticket: DigestTicket,
        result: std::result::Result<String, DigestError>,
    ) -> Result<()> {
        if self.digest_pending == Some(ticket.selection_id) {
            self.digest_pending = None;
        }

        if ticket.selection_id != self.session.selection_id() {
            debug!(file = ticket.file.name(), "discarding digest for a previous selection");
            return Ok(());
        }

        match result {
            Ok(hash) => {
                info!(file = ticket.file.name(), %hash, "digest computed");
                self.session.set_hash(ticket.selection_id, hash);
                self.notifications.push(Level::Success, "Digest computed");
                Ok(())
            }
            Err(e) => Err(self.fail_digest(ticket.file.name(), e)),
        }
    }

    /// ファイル内容を取得できずダイジェストに進めなかった場合の記録
    ///
    /// 選択中のファイルとハッシュはそのまま残す。
    pub fn fail_digest(&mut self, name: &str, error: DigestError) -> OrchestratorError {
        warn!(file = name, error = %error, "digest failed");
        self.last_transition = Some(Transition::HashFailed);
        self.notifications
            .push(Level::Error, format!("Digest computation failed: {}", error));
        error.into()
    }

    /// 選択中ファイルのダイジェストをその場で計算
    pub fn compute_digest(&mut self) -> Result<()> {
        let ticket = self.begin_digest().ok_or(OrchestratorError::NoFileSelected)?;
        let result = ticket.compute();
        self.finish_digest(ticket, result)
    }

    // =============================================
    // スキャン
    // =============================================

    /// スキャン開始
    ///
    /// - ファイル未選択: `NoFileSelected`（警告1件、通信なし）
    /// - 送信中: `Ok(None)`（何もしない）
    pub fn begin_scan(&mut self) -> Result<Option<ScanTicket>> {
        let Some(file) = self.session.selected_file().cloned() else {
            warn!("scan requested without a selected file");
            self.notifications.push(Level::Warning, "Select a file first");
            return Err(OrchestratorError::NoFileSelected);
        };

        if self.scan_in_flight {
            debug!("scan already in flight, ignoring");
            return Ok(None);
        }

        info!(file = file.name(), size = file.size(), "submitting file for scan");
        self.scan_in_flight = true;
        Ok(Some(ScanTicket {
            selection_id: self.session.selection_id(),
            filename: file.name().to_string(),
            hash: self.session.selected_file_hash().map(str::to_string),
            file: Some(file),
        }))
    }

    /// スキャン完了（成功・失敗とも必ずストアに1件追加する）
    pub fn finish_scan(
        &mut self,
        ticket: ScanTicket,
        response: std::result::Result<ScanResult, ApiError>,
    ) -> ScanOutcome {
        self.scan_in_flight = false;

        match response {
            Ok(result) => {
                info!(
                    file = %result.filename,
                    hash = %result.hash,
                    detected = result.any_engine_detected(),
                    "scan completed"
                );
                self.store.prepend(result);
                self.last_transition = Some(Transition::Completed);
                self.notifications.push(Level::Success, "Scan complete");
                ScanOutcome::Completed
            }
            Err(e) => {
                let cause = e.to_string();
                warn!(file = %ticket.filename, error = %cause, "scan failed");

                let hash = self.hash_for(&ticket);
                let failed = ScanResult::failed(&ticket.filename, hash.as_deref(), &cause, Utc::now());
                self.store.prepend(failed);
                self.last_transition = Some(Transition::ScanFailed);
                self.notifications
                    .push(Level::Error, format!("Scan failed: {}", cause));
                ScanOutcome::Failed(cause)
            }
        }
    }

    /// 選択中ファイルを送信して結果を反映
    pub async fn start_scan(&mut self) -> Result<ScanOutcome> {
        let Some(ticket) = self.begin_scan()? else {
            return Ok(ScanOutcome::Ignored);
        };

        let response = match ticket.file() {
            Some(file) => self.api.submit_scan(file).await,
            None => Err(ApiError::Read("no file captured".into())),
        };
        Ok(self.finish_scan(ticket, response))
    }

    /// バックエンドのEICAR自己診断（スキャン1回として扱う）
    pub fn begin_eicar_check(&mut self) -> Option<ScanTicket> {
        if self.scan_in_flight {
            debug!("scan already in flight, ignoring EICAR check");
            return None;
        }

        info!("requesting backend EICAR self-test");
        self.scan_in_flight = true;
        Some(ScanTicket {
            selection_id: 0,
            filename: EICAR_TEST_NAME.to_string(),
            hash: None,
            file: None,
        })
    }

    pub async fn run_eicar_check(&mut self) -> ScanOutcome {
        let Some(ticket) = self.begin_eicar_check() else {
            return ScanOutcome::Ignored;
        };

        let response = self.api.eicar_test().await;
        self.finish_scan(ticket, response)
    }

    /// 失敗結果に使うハッシュ（同じ選択なら最新の値を優先）
    fn hash_for(&self, ticket: &ScanTicket) -> Option<String> {
        if ticket.file.is_some() && ticket.selection_id == self.session.selection_id() {
            if let Some(hash) = self.session.selected_file_hash() {
                return Some(hash.to_string());
            }
        }
        ticket.hash.clone()
    }

    // =============================================
    // ステータス・履歴
    // =============================================

    pub async fn check_status(&mut self) -> ApiHealth {
        let response = self.api.status().await;
        self.apply_status(response)
    }

    /// ステータス応答を反映して通知
    pub fn apply_status(
        &mut self,
        response: std::result::Result<BackendStatus, ApiError>,
    ) -> ApiHealth {
        match response {
            Ok(status) if status.is_online() => {
                info!(connected = status.connected, "API online");
                self.notifications.push(Level::Success, "System active");
                let mode = if status.connected {
                    "Backend database: connected"
                } else {
                    "Backend database: demo mode"
                };
                self.notifications.push(Level::Info, mode);
                ApiHealth::Online {
                    database_connected: status.connected,
                }
            }
            Ok(status) => {
                warn!(status = %status.status, "API reported offline");
                self.notifications.push(Level::Error, "API offline");
                ApiHealth::Offline {
                    reason: format!("backend reported status \"{}\"", status.status),
                }
            }
            Err(e) => {
                warn!(error = %e, "API status check failed");
                self.notifications
                    .push(Level::Error, "Could not connect to server");
                ApiHealth::Offline {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 履歴を読み込んでストアを置換
    ///
    /// 配列以外の応答・通信失敗は通知せず、ストアもそのまま。
    /// 読み込んだ件数を返す。
    pub async fn load_history(&mut self) -> Option<usize> {
        let response = self.api.history().await;
        self.apply_history(response)
    }

    pub fn apply_history(&mut self, response: std::result::Result<Value, ApiError>) -> Option<usize> {
        let value = match response {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "history load failed");
                return None;
            }
        };

        match parse_history(value) {
            Some(results) => {
                let count = results.len();
                info!(count, "history loaded");
                self.store.replace_all(results);
                Some(count)
            }
            None => {
                debug!("history response is not an array, treating as empty");
                None
            }
        }
    }
}
