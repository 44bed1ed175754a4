//! 演出用プログレス
//!
//! 固定の段階を一定間隔で進めるだけで、実際の通信完了とは連動しない。
//! オーケストレータはこのモジュールに依存しない。

use std::time::Duration;

/// 各段階の間隔
pub const STEP_INTERVAL: Duration = Duration::from_millis(1000);

/// (進捗率, 表示テキスト)
pub const PROGRESS_PHASES: [(u8, &str); 7] = [
    (10, "Initializing scanner..."),
    (25, "Computing checksums..."),
    (40, "Submitting to primary engine..."),
    (60, "Analysing with 70+ engines..."),
    (75, "Checking secondary engine..."),
    (90, "Running heuristics..."),
    (100, "Building report..."),
];

/// 全段階の所要時間
pub fn total_duration() -> Duration {
    STEP_INTERVAL * (PROGRESS_PHASES.len() as u32 - 1)
}

/// 段階 `step` を表示する時刻（開始からのオフセット）
pub fn step_offset(step: usize) -> Duration {
    STEP_INTERVAL * step as u32
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressIndicator {
    percent: u8,
    label: &'static str,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// 段階を進める（範囲外は無視）
    pub fn advance(&mut self, step: usize) {
        if let Some(&(percent, label)) = PROGRESS_PHASES.get(step) {
            self.percent = percent;
            self.label = label;
        }
    }

    /// 0%に戻す
    pub fn reset(&mut self) {
        self.percent = 0;
        self.label = "";
    }
}
