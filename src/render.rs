//! ターミナル表示
//!
//! 結果テーブル（新しい順に最大10件）と、clean / suspicious / malicious の内訳。

use scan_dashboard_common::{
    classify, format_file_size, AggregateCounts, BackendStats, Level, Notification, ScanResult,
    Verdict,
};
use std::fmt::Write;

const FILE_COLUMN_WIDTH: usize = 28;
const BAR_WIDTH: usize = 24;

pub fn verdict_badge(verdict: Verdict) -> String {
    let icon = match verdict {
        Verdict::Clean => "✔",
        Verdict::Suspicious => "?",
        Verdict::Threat => "✖",
        Verdict::Error => "!",
    };
    format!("{} {}", icon, verdict.label())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// 結果テーブル
pub fn render_table(results: &[ScanResult]) -> String {
    if results.is_empty() {
        return "  (no scans yet)\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<13} {:<width$} {:>9} {:<16} {}",
        "STATUS",
        "FILE",
        "PRIMARY",
        "SECONDARY",
        "TIME",
        width = FILE_COLUMN_WIDTH
    );

    for result in results {
        let _ = writeln!(
            out,
            "  {:<13} {:<width$} {:>9} {:<16} {}",
            verdict_badge(classify(result)),
            truncate(&result.filename, FILE_COLUMN_WIDTH),
            result.primary_summary(),
            truncate(&result.secondary_summary(), 16),
            result.time_label(),
            width = FILE_COLUMN_WIDTH
        );
    }

    out
}

fn bar(count: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (count * BAR_WIDTH + total / 2) / total
    }
    .min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// 集計の内訳（ドーナツグラフの代わり）
pub fn render_breakdown(counts: &AggregateCounts) -> String {
    let mut out = String::new();
    let rows = [
        ("Clean", counts.clean),
        ("Suspicious", counts.suspicious),
        ("Malicious", counts.threat),
    ];

    for (label, count) in rows {
        let _ = writeln!(out, "  {:<11} {} {}", label, bar(count, counts.total), count);
    }

    let _ = write!(out, "  total {}", counts.total);
    if counts.malformed > 0 {
        let _ = write!(out, " ({} without a valid timestamp skipped)", counts.malformed);
    }
    out.push('\n');
    out
}

/// 1件の詳細
pub fn render_result_detail(result: &ScanResult, local_hash: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  File:      {}", result.filename);
    let _ = writeln!(out, "  Verdict:   {}", verdict_badge(classify(result)));
    let _ = writeln!(out, "  SHA-256:   {}", result.hash);
    if let Some(local) = local_hash {
        if local != result.hash {
            let _ = writeln!(out, "  Local:     {}", local);
        }
    }
    if let Some(size) = result.extra.get("size").and_then(|v| v.as_u64()) {
        let _ = writeln!(out, "  Size:      {}", format_file_size(size));
    }

    let primary = match result.primary_engine.as_ref().and_then(|e| e.error.as_deref()) {
        Some(error) => format!("error: {}", error),
        None => result.primary_summary(),
    };
    let _ = writeln!(out, "  Primary:   {}", primary);
    let _ = writeln!(out, "  Secondary: {}", result.secondary_summary());
    let _ = writeln!(out, "  Time:      {}", result.time_label());
    out
}

pub fn render_stats(stats: &BackendStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Total scans:   {}", stats.total_scans);
    let _ = writeln!(out, "  Threats found: {}", stats.threats_found);
    let _ = writeln!(out, "  Clean files:   {}", stats.clean_files);
    let _ = writeln!(
        out,
        "  Last scan:     {}",
        stats.last_scan.as_deref().unwrap_or("-")
    );
    out
}

pub fn notification_line(notification: &Notification) -> String {
    let icon = match notification.level {
        Level::Info => "ℹ",
        Level::Success => "✔",
        Level::Warning => "⚠",
        Level::Error => "✖",
    };
    format!("{} {}", icon, notification.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.txt", 10), "short.txt");
        assert_eq!(truncate("a-very-long-file-name.txt", 8), "a-very-…");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 0), "░".repeat(BAR_WIDTH));
        assert_eq!(bar(4, 4), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(1, 2).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }
}
