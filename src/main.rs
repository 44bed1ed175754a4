use anyhow::Context;
use clap::Parser;
use scan_dashboard::{cli, client, config, dashboard, error, logging, render, workflow};
use cli::{Cli, Commands};
use client::HttpScanApi;
use config::Config;
use error::DashboardError;
use scan_dashboard_common::{
    digest_file, ApiHealth, Orchestrator, OrchestratorError, ScanApi, ScanOutcome, SelectedFile,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗しました")?;
    if let Some(url) = cli.api_url.clone() {
        config.set_api_url(url)?;
    }

    // 設定コマンドはAPIクライアント不要
    if let Commands::Config { set_api_url, show } = &cli.command {
        if let Some(url) = set_api_url {
            config.set_api_url(url.clone())?;
            config.save().context("設定の保存に失敗しました")?;
            println!("✔ API URLを設定しました: {}", config.api_url);
        }

        if *show || set_api_url.is_none() {
            println!("設定:");
            println!("  API URL: {}", config.api_url);
            println!(
                "  タイムアウト: {}",
                config
                    .timeout_seconds
                    .map(|s| format!("{}秒", s))
                    .unwrap_or_else(|| "なし".into())
            );
            println!(
                "  起動時に履歴を読み込む: {}",
                if config.history_on_start { "はい" } else { "いいえ" }
            );
            if let Ok(path) = Config::config_path() {
                println!("  設定ファイル: {}", path.display());
            }
        }
        return Ok(());
    }

    // ハッシュ計算もローカルのみ
    if let Commands::Hash { file } = &cli.command {
        let selected = SelectedFile::from_path(file)
            .with_context(|| format!("ファイルを開けません: {}", file.display()))?;
        let hash = digest_file(&selected)?;
        println!("{}  {}", hash, selected.name());
        return Ok(());
    }

    let api = HttpScanApi::from_config(&config)?;
    tracing::debug!(api_url = api.base_url(), "using scan API");

    match cli.command {
        Commands::Status => {
            let mut orchestrator = Orchestrator::new(api);
            let health = orchestrator.check_status().await;
            workflow::print_notifications(&mut orchestrator);
            if let ApiHealth::Offline { reason } = health {
                anyhow::bail!("API offline: {}", reason);
            }
        }

        Commands::History { limit } => {
            let mut orchestrator = Orchestrator::new(api);
            if orchestrator.load_history().await.is_none() {
                println!("履歴はありません");
            }
            let store = orchestrator.store();
            let visible = store.visible();
            print!("{}", render::render_table(&visible[..limit.min(visible.len())]));
            println!();
            print!("{}", render::render_breakdown(&store.counts()));
        }

        Commands::Scan { file, json, no_history } => {
            let mut orchestrator = Orchestrator::new(api);
            if config.history_on_start && !no_history {
                orchestrator.load_history().await;
            }

            let selected = workflow::select_and_hash(&mut orchestrator, &file).await;
            workflow::print_notifications(&mut orchestrator);
            match selected {
                Ok(_) => {}
                Err(DashboardError::Common(OrchestratorError::FileTooLarge { name, size })) => {
                    anyhow::bail!("ファイルサイズが上限を超えています: {} ({} bytes)", name, size);
                }
                Err(e) => return Err(e).context("ファイルの選択に失敗しました"),
            }

            let outcome = workflow::scan_with_progress(&mut orchestrator, !json).await?;
            workflow::print_notifications(&mut orchestrator);

            let store = orchestrator.store();
            if json {
                if let Some(latest) = store.latest() {
                    println!("{}", serde_json::to_string_pretty(latest)?);
                }
            } else {
                if let Some(latest) = store.latest() {
                    let local = orchestrator.session().selected_file_hash();
                    print!("{}", render::render_result_detail(latest, local));
                }
                println!();
                print!("{}", render::render_table(store.visible()));
                println!();
                print!("{}", render::render_breakdown(&store.counts()));
            }

            if let ScanOutcome::Failed(cause) = outcome {
                anyhow::bail!("スキャンに失敗しました: {}", cause);
            }
        }

        Commands::Eicar => {
            let mut orchestrator = Orchestrator::new(api);
            let outcome = workflow::eicar_with_progress(&mut orchestrator, true).await;
            workflow::print_notifications(&mut orchestrator);

            if let Some(latest) = orchestrator.store().latest() {
                print!("{}", render::render_result_detail(latest, None));
            }
            if let ScanOutcome::Failed(cause) = outcome {
                anyhow::bail!("EICAR自己診断に失敗しました: {}", cause);
            }
        }

        Commands::Stats => {
            let stats = api.stats().await.context("統計の取得に失敗しました")?;
            print!("{}", render::render_stats(&stats));
        }

        Commands::Dashboard => {
            dashboard::run(api, config.history_on_start).await?;
        }

        Commands::Hash { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}
