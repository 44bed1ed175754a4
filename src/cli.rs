use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scan-dashboard")]
#[command(about = "ファイルスキャンAPIクライアント・結果ダッシュボード", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIベースURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// APIステータスを確認
    Status,

    /// スキャン履歴を表示
    History {
        /// 表示件数（最大10件）
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// ファイルのSHA-256をローカルで計算
    Hash {
        /// 対象ファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// ファイルをアップロードしてスキャン
    Scan {
        /// 対象ファイル（最大32MB）
        #[arg(required = true)]
        file: PathBuf,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// 履歴を読み込まずにスキャン
        #[arg(long)]
        no_history: bool,
    },

    /// バックエンドのEICAR自己診断を実行
    Eicar,

    /// バックエンド側の統計を表示
    Stats,

    /// 対話モードでダッシュボードを起動
    Dashboard,

    /// 設定を表示/編集
    Config {
        /// API URLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
