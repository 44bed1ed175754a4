//! 画面状態
//!
//! オーケストレータ本体は `StoredValue`（ローカル）に置き、
//! 操作のたびに表示用のシグナルへ反映する。
//! 通信中はオーケストレータを借用しないよう、begin/finish に分けて呼び出す。

use crate::api::{js_error_message, FetchApi};
use chrono::{DateTime, Utc};
use gloo::timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use scan_dashboard_common::progress::{ProgressIndicator, PROGRESS_PHASES, STEP_INTERVAL};
use scan_dashboard_common::{
    AggregateCounts, ApiError, ApiHealth, DigestError, Level, Notification, Orchestrator, Phase,
    ScanApi, ScanResult, ScanTicket, SelectedFile, NOTIFICATION_TTL_SECS,
};
use wasm_bindgen_futures::JsFuture;

/// 選択中ファイルの表示情報
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub hash: Option<String>,
}

/// 表示に必要なオーケストレータの状態の写し
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub results: Vec<ScanResult>,
    pub counts: AggregateCounts,
    pub phase: Phase,
    pub can_scan: bool,
    pub file_info: Option<FileInfo>,
}

impl Snapshot {
    pub fn capture<A: ScanApi>(orchestrator: &Orchestrator<A>) -> Self {
        let store = orchestrator.store();
        let session = orchestrator.session();

        Self {
            results: store.visible().to_vec(),
            counts: store.counts(),
            phase: orchestrator.phase(),
            can_scan: orchestrator.can_start_scan(),
            file_info: session.selected_file().map(|file| FileInfo {
                name: file.name().to_string(),
                size: file.size(),
                hash: session.selected_file_hash().map(str::to_string),
            }),
        }
    }
}

/// 期限切れのトーストを取り除く
pub fn prune_expired(toasts: &mut Vec<Notification>, now: DateTime<Utc>) {
    toasts.retain(|n| !n.is_expired(now));
}

/// クリップボードへのコピー結果に対応する通知
pub fn copy_notice(result: &Result<(), String>) -> (Level, &'static str) {
    match result {
        Ok(()) => (Level::Success, "Hash copied to clipboard"),
        Err(_) => (Level::Error, "Could not copy hash"),
    }
}

/// 進捗演出の世代。停止すると古いタイマーは次の刻みで止まる
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressRun(u64);

impl ProgressRun {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, run: u64) -> bool {
        self.0 == run
    }
}

#[derive(Clone, Copy)]
pub struct DashboardState {
    orchestrator: StoredValue<Orchestrator<FetchApi>, LocalStorage>,
    progress_run: StoredValue<ProgressRun>,
    pub health: RwSignal<Option<ApiHealth>>,
    pub results: RwSignal<Vec<ScanResult>>,
    pub counts: RwSignal<AggregateCounts>,
    pub file_info: RwSignal<Option<FileInfo>>,
    pub phase: RwSignal<Phase>,
    pub can_scan: RwSignal<bool>,
    pub progress: RwSignal<ProgressIndicator>,
    pub toasts: RwSignal<Vec<Notification>>,
}

impl DashboardState {
    pub fn new(api: FetchApi) -> Self {
        Self {
            orchestrator: StoredValue::new_local(Orchestrator::new(api)),
            progress_run: StoredValue::new(ProgressRun::default()),
            health: RwSignal::new(None),
            results: RwSignal::new(Vec::new()),
            counts: RwSignal::new(AggregateCounts::default()),
            file_info: RwSignal::new(None),
            phase: RwSignal::new(Phase::Idle),
            can_scan: RwSignal::new(false),
            progress: RwSignal::new(ProgressIndicator::new()),
            toasts: RwSignal::new(Vec::new()),
        }
    }

    fn api(&self) -> FetchApi {
        self.orchestrator.with_value(|o| o.api().clone())
    }

    /// オーケストレータの状態をシグナルへ反映
    fn sync(&self) {
        if let Some(snapshot) = self.orchestrator.try_with_value(Snapshot::capture) {
            self.results.set(snapshot.results);
            self.counts.set(snapshot.counts);
            self.phase.set(snapshot.phase);
            self.can_scan.set(snapshot.can_scan);
            self.file_info.set(snapshot.file_info);
        }

        let fresh = self
            .orchestrator
            .try_update_value(|o| o.notifications_mut().drain())
            .unwrap_or_default();
        if !fresh.is_empty() {
            self.show_toasts(fresh);
        }
    }

    fn show_toasts(&self, fresh: Vec<Notification>) {
        self.toasts.update(|toasts| toasts.extend(fresh));

        let toasts = self.toasts;
        spawn_local(async move {
            TimeoutFuture::new((NOTIFICATION_TTL_SECS * 1000) as u32).await;
            toasts.update(|toasts| prune_expired(toasts, Utc::now()));
        });
    }

    fn notify(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        self.orchestrator
            .update_value(|o| o.notifications_mut().push(level, message));
        self.sync();
    }

    // =============================================
    // ステータス・履歴
    // =============================================

    pub fn check_status(self) {
        spawn_local(async move {
            let response = self.api().status().await;
            let health = self
                .orchestrator
                .try_update_value(|o| o.apply_status(response));
            self.health.set(health);
            self.sync();
        });
    }

    pub fn load_history(self) {
        spawn_local(async move {
            let response = self.api().history().await;
            self.orchestrator
                .update_value(|o| {
                    o.apply_history(response);
                });
            self.sync();
        });
    }

    // =============================================
    // ファイル選択・ダイジェスト
    // =============================================

    /// 選択されたファイルを読み込む（サイズ確認は読み込み前）
    pub fn select_file(self, file: web_sys::File) {
        let name = file.name();
        let size = file.size() as u64;

        if !self.accept_size(&name, size) {
            return;
        }

        spawn_local(async move {
            let bytes = match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => js_sys::Uint8Array::new(&buffer).to_vec(),
                Err(e) => {
                    let error = DigestError::Unavailable(js_error_message(&e));
                    self.orchestrator.update_value(|o| {
                        o.fail_digest(&name, error);
                    });
                    self.sync();
                    return;
                }
            };

            let ticket = self
                .orchestrator
                .try_update_value(|o| {
                    o.select_file(SelectedFile::from_bytes(name, bytes)).ok()?;
                    o.begin_digest()
                })
                .flatten();
            self.sync();

            let Some(ticket) = ticket else {
                return;
            };

            // 計算中の表示を先に描画させる
            TimeoutFuture::new(0).await;
            let result = ticket.compute();
            self.orchestrator.update_value(|o| {
                let _ = o.finish_digest(ticket, result);
            });
            self.sync();
        });
    }

    fn accept_size(&self, name: &str, size: u64) -> bool {
        let accepted = self
            .orchestrator
            .try_update_value(|o| o.validate_size(name, size).is_ok())
            .unwrap_or(false);
        if !accepted {
            self.sync();
        }
        accepted
    }

    /// 計算済みハッシュをクリップボードへコピー
    pub fn copy_hash(self) {
        let hash = self
            .file_info
            .with_untracked(|f| f.as_ref().and_then(|f| f.hash.clone()));
        let Some(hash) = hash else {
            self.notify(Level::Warning, "Digest is not ready yet");
            return;
        };

        spawn_local(async move {
            let result = match web_sys::window() {
                Some(window) => JsFuture::from(window.navigator().clipboard().write_text(&hash))
                    .await
                    .map(|_| ())
                    .map_err(|e| js_error_message(&e)),
                None => Err("no window".to_string()),
            };

            if let Err(e) = &result {
                web_sys::console::error_1(&format!("clipboard write failed: {}", e).into());
            }
            let (level, message) = copy_notice(&result);
            self.notify(level, message);
        });
    }

    // =============================================
    // スキャン
    // =============================================

    pub fn start_scan(self) {
        let ticket = self
            .orchestrator
            .try_update_value(|o| o.begin_scan().ok().flatten())
            .flatten();
        self.sync();

        if let Some(ticket) = ticket {
            self.start_progress();
            spawn_local(async move {
                let api = self.api();
                let response = match ticket.file() {
                    Some(file) => api.submit_scan(file).await,
                    None => Err(ApiError::Read("no file captured".into())),
                };
                self.complete_scan(ticket, response);
            });
        }
    }

    pub fn run_eicar_check(self) {
        let ticket = self
            .orchestrator
            .try_update_value(|o| o.begin_eicar_check())
            .flatten();
        self.sync();

        if let Some(ticket) = ticket {
            self.start_progress();
            spawn_local(async move {
                let response = self.api().eicar_test().await;
                self.complete_scan(ticket, response);
            });
        }
    }

    fn complete_scan(&self, ticket: ScanTicket, response: Result<ScanResult, ApiError>) {
        self.orchestrator.update_value(|o| {
            o.finish_scan(ticket, response);
        });
        self.stop_progress();
        self.sync();
    }

    // =============================================
    // プログレス（演出のみ）
    // =============================================

    fn start_progress(&self) {
        let run = self.next_progress_run();
        let state = *self;

        spawn_local(async move {
            for step in 0..PROGRESS_PHASES.len() {
                if !state.progress_run.with_value(|r| r.is_current(run)) {
                    return;
                }
                state.progress.update(|p| p.advance(step));
                TimeoutFuture::new(STEP_INTERVAL.as_millis() as u32).await;
            }
        });
    }

    fn stop_progress(&self) {
        self.next_progress_run();
        self.progress.update(|p| p.reset());
    }

    fn next_progress_run(&self) -> u64 {
        self.progress_run
            .try_update_value(|r| r.next())
            .unwrap_or_default()
    }
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn state() -> DashboardState {
        DashboardState::new(FetchApi::new("http://127.0.0.1:9/api"))
    }

    #[wasm_bindgen_test]
    fn wasm_scan_without_file_warns_and_stays_idle() {
        let state = state();
        state.start_scan();

        assert_eq!(state.phase.get_untracked(), Phase::Idle);
        assert!(!state.can_scan.get_untracked());
        let toasts = state.toasts.get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, Level::Warning);
    }

    #[wasm_bindgen_test]
    fn wasm_oversize_file_is_rejected() {
        let state = state();
        assert!(!state.accept_size("big.iso", scan_dashboard_common::MAX_FILE_SIZE + 1));
        assert!(state.accept_size("ok.txt", 10));

        assert!(state.file_info.get_untracked().is_none());
        assert_eq!(state.toasts.get_untracked()[0].level, Level::Warning);
    }

    #[wasm_bindgen_test]
    fn wasm_complete_scan_resets_progress_and_syncs() {
        let state = state();
        let ticket = state
            .orchestrator
            .try_update_value(|o| {
                o.select_file(SelectedFile::from_bytes("a.txt", b"abc".to_vec())).ok()?;
                o.begin_scan().ok().flatten()
            })
            .flatten()
            .unwrap();
        state.start_progress();
        state.progress.update(|p| p.advance(3));

        state.complete_scan(ticket, Err(ApiError::Network("Failed to fetch".into())));

        assert_eq!(state.progress.get_untracked().percent(), 0);
        assert_eq!(state.results.get_untracked().len(), 1);
        assert!(state.results.get_untracked()[0].is_error());
        assert!(state.can_scan.get_untracked());
    }

    #[wasm_bindgen_test]
    fn wasm_copy_without_digest_warns() {
        let state = state();
        state.copy_hash();

        let toasts = state.toasts.get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Digest is not ready yet");
    }
}
