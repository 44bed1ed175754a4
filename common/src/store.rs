//! スキャン結果ストア
//!
//! 新しい順に並んだ結果の集合。要素は追加後に変更されず、
//! 先頭への追加（prepend）と一括置換（履歴読み込み）のみ行う。
//! 表示用の件数制限は `visible()` にだけ適用し、内部の集合は制限しない。

use crate::types::ScanResult;
use serde::Serialize;

/// テーブルに表示する最大件数
pub const VISIBLE_LIMIT: usize = 10;

/// 表示用の判定（描画のたびに再計算し、エンティティには保存しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Clean,
    Suspicious,
    Threat,
    Error,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Clean => "CLEAN",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::Threat => "THREAT",
            Verdict::Error => "ERROR",
        }
    }
}

/// 1件の結果を判定
///
/// 1. status が error → Error
/// 2. いずれかのエンジンが検出 → Threat
/// 3. status が suspicious → Suspicious
/// 4. それ以外 → Clean
pub fn classify(result: &ScanResult) -> Verdict {
    if result.is_error() {
        Verdict::Error
    } else if result.any_engine_detected() {
        Verdict::Threat
    } else if result.is_suspicious() {
        Verdict::Suspicious
    } else {
        Verdict::Clean
    }
}

/// 集計値
///
/// clean / threat / suspicious はそれぞれ独立に数えるため、排他的ではない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCounts {
    /// どのエンジンも検出していない件数
    pub clean: usize,
    /// status が suspicious の件数
    pub suspicious: usize,
    /// いずれかのエンジンが検出した件数
    pub threat: usize,
    /// 集計対象の件数
    pub total: usize,
    /// タイムスタンプ不正で除外した件数
    pub malformed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Vec<ScanResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 先頭に追加
    pub fn prepend(&mut self, result: ScanResult) {
        self.results.insert(0, result);
    }

    /// 全件置換（履歴読み込み）
    pub fn replace_all(&mut self, results: Vec<ScanResult>) {
        self.results = results;
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn latest(&self) -> Option<&ScanResult> {
        self.results.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter()
    }

    /// テーブル表示用（新しい順に最大10件）
    pub fn visible(&self) -> &[ScanResult] {
        let end = self.results.len().min(VISIBLE_LIMIT);
        &self.results[..end]
    }

    /// 全件を走査して集計
    pub fn counts(&self) -> AggregateCounts {
        let mut counts = AggregateCounts::default();

        for result in &self.results {
            if !result.is_well_formed() {
                counts.malformed += 1;
                continue;
            }

            counts.total += 1;
            if result.any_engine_detected() {
                counts.threat += 1;
            } else {
                counts.clean += 1;
            }
            if result.is_suspicious() {
                counts.suspicious += 1;
            }
        }

        counts
    }
}
