//! 対話モード・単発コマンド共通の処理手順

use crate::error::{DashboardError, Result};
use crate::progress::ScanProgress;
use crate::render;
use scan_dashboard_common::{Orchestrator, OrchestratorError, ScanApi, ScanOutcome, SelectedFile};
use std::path::Path;

/// ファイルを選択してダイジェストを計算
///
/// サイズ超過は `Err`、ダイジェスト失敗は `Ok(None)`（スキャンは続行できる）。
pub async fn select_and_hash<A: ScanApi>(
    orchestrator: &mut Orchestrator<A>,
    path: &Path,
) -> Result<Option<String>> {
    if !path.exists() {
        return Err(DashboardError::FileNotFound(path.display().to_string()));
    }

    let file = SelectedFile::from_path(path)?;
    orchestrator.select_file(file)?;

    let Some(ticket) = orchestrator.begin_digest() else {
        return Ok(None);
    };

    // ハッシュ計算はブロッキングスレッドで
    let (ticket, result) = tokio::task::spawn_blocking(move || {
        let result = ticket.compute();
        (ticket, result)
    })
    .await?;

    match orchestrator.finish_digest(ticket, result) {
        Ok(()) => Ok(orchestrator.session().selected_file_hash().map(str::to_string)),
        Err(OrchestratorError::Digest(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 進捗バーを表示しながらスキャン
pub async fn scan_with_progress<A: ScanApi>(
    orchestrator: &mut Orchestrator<A>,
    show_progress: bool,
) -> Result<ScanOutcome> {
    let progress = ScanProgress::start(show_progress);
    let outcome = orchestrator.start_scan().await;
    progress.finish();
    Ok(outcome?)
}

/// バックエンドのEICAR自己診断
pub async fn eicar_with_progress<A: ScanApi>(
    orchestrator: &mut Orchestrator<A>,
    show_progress: bool,
) -> ScanOutcome {
    let progress = ScanProgress::start(show_progress);
    let outcome = orchestrator.run_eicar_check().await;
    progress.finish();
    outcome
}

/// 溜まった通知を標準エラーに出力
pub fn print_notifications<A: ScanApi>(orchestrator: &mut Orchestrator<A>) {
    for notification in orchestrator.notifications_mut().drain() {
        eprintln!("{}", render::notification_line(&notification));
    }
}
