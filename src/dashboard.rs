//! 対話モード（dialoguer）
//!
//! ファイル選択・スキャン・結果一覧を1つのセッションで繰り返す。

use crate::client::HttpScanApi;
use crate::error::{DashboardError, Result};
use crate::render;
use crate::workflow::{eicar_with_progress, print_notifications, scan_with_progress, select_and_hash};
use dialoguer::{Input, Select};
use scan_dashboard_common::{ApiHealth, Orchestrator, OrchestratorError, Phase};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    SelectFile,
    StartScan,
    ShowResults,
    ReloadHistory,
    CheckStatus,
    EicarTest,
    Quit,
}

const MENU: [(MenuAction, &str); 7] = [
    (MenuAction::SelectFile, "ファイルを選択"),
    (MenuAction::StartScan, "スキャン開始"),
    (MenuAction::ShowResults, "結果を表示"),
    (MenuAction::ReloadHistory, "履歴を再読み込み"),
    (MenuAction::CheckStatus, "APIステータス確認"),
    (MenuAction::EicarTest, "EICAR自己診断"),
    (MenuAction::Quit, "終了"),
];

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "ファイル未選択",
        Phase::FileSelected => "ファイル選択済み",
        Phase::HashComputing => "ハッシュ計算中",
        Phase::HashReady => "ハッシュ計算済み",
        Phase::Scanning => "スキャン中",
    }
}

pub async fn run(api: HttpScanApi, load_history: bool) -> Result<()> {
    println!("🛡  scan-dashboard - {}\n", api.base_url());

    let mut orchestrator = Orchestrator::new(api);

    if let ApiHealth::Offline { reason } = orchestrator.check_status().await {
        tracing::warn!(%reason, "starting dashboard while API is offline");
    }
    if load_history {
        orchestrator.load_history().await;
    }
    print_notifications(&mut orchestrator);

    loop {
        println!();
        if let Some(file) = orchestrator.session().selected_file() {
            println!("選択中: {} ({})", file.name(), phase_label(orchestrator.phase()));
        }

        let labels: Vec<&str> = MENU.iter().map(|(_, label)| *label).collect();
        let choice = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        match MENU[choice].0 {
            MenuAction::SelectFile => {
                let input: String = Input::new()
                    .with_prompt("ファイルパス")
                    .interact_text()?;
                let path = PathBuf::from(input.trim());

                match select_and_hash(&mut orchestrator, &path).await {
                    Ok(Some(hash)) => println!("SHA-256: {}", hash),
                    Ok(None) => {}
                    Err(DashboardError::Common(OrchestratorError::FileTooLarge { .. })) => {}
                    Err(e) => eprintln!("✖ {}", e),
                }
                print_notifications(&mut orchestrator);
            }

            MenuAction::StartScan => {
                let result = scan_with_progress(&mut orchestrator, true).await;
                print_notifications(&mut orchestrator);
                match result {
                    Ok(_) => {
                        if let Some(latest) = orchestrator.store().latest() {
                            let local = orchestrator.session().selected_file_hash();
                            print!("{}", render::render_result_detail(latest, local));
                        }
                    }
                    Err(DashboardError::Common(OrchestratorError::NoFileSelected)) => {}
                    Err(e) => eprintln!("✖ {}", e),
                }
            }

            MenuAction::ShowResults => show_results(&orchestrator),

            MenuAction::ReloadHistory => match orchestrator.load_history().await {
                Some(count) => println!("✔ {}件の履歴を読み込みました", count),
                None => println!("履歴はありません"),
            },

            MenuAction::CheckStatus => {
                orchestrator.check_status().await;
                print_notifications(&mut orchestrator);
            }

            MenuAction::EicarTest => {
                eicar_with_progress(&mut orchestrator, true).await;
                print_notifications(&mut orchestrator);
                if let Some(latest) = orchestrator.store().latest() {
                    print!("{}", render::render_result_detail(latest, None));
                }
            }

            MenuAction::Quit => break,
        }
    }

    Ok(())
}

fn show_results<A: scan_dashboard_common::ScanApi>(orchestrator: &Orchestrator<A>) {
    let store = orchestrator.store();
    println!("最近のスキャン ({}件中 最大10件)", store.len());
    print!("{}", render::render_table(store.visible()));
    println!();
    print!("{}", render::render_breakdown(&store.counts()));
}
