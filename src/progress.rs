//! スキャン中の進捗表示（indicatif）
//!
//! 表示は演出のみで、実際の通信状況とは連動しない。
//! 1秒ごとにフェーズを進め、100%に達したらそのまま待つ。

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use scan_dashboard_common::progress::{ProgressIndicator, PROGRESS_PHASES, STEP_INTERVAL};
use tokio::task::JoinHandle;

pub struct ScanProgress {
    bar: ProgressBar,
    ticker: Option<JoinHandle<()>>,
}

impl ScanProgress {
    /// 進捗表示を開始（`visible = false` なら描画しない）
    pub fn start(visible: bool) -> Self {
        let bar = ProgressBar::new(100);
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos:>3}% {msg}") {
            bar.set_style(style.progress_chars("=> "));
        }

        let handle = bar.clone();
        let ticker = tokio::spawn(async move {
            let mut indicator = ProgressIndicator::default();
            for step in 0..PROGRESS_PHASES.len() {
                indicator.advance(step);
                handle.set_position(u64::from(indicator.percent()));
                handle.set_message(indicator.label());
                tokio::time::sleep(STEP_INTERVAL).await;
            }
        });

        Self {
            bar,
            ticker: Some(ticker),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// 終了（0%に戻して消去）
    pub fn finish(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        // finish_and_clear は位置を末尾に進めるので、消去後に0へ戻す
        self.bar.finish_and_clear();
        self.bar.set_position(0);
    }
}

impl Drop for ScanProgress {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            self.stop();
        }
    }
}
