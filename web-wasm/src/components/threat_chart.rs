//! 内訳グラフ（CSS conic-gradient のドーナツ）

use leptos::prelude::*;
use scan_dashboard_common::AggregateCounts;

const CLEAN_COLOR: &str = "#22c55e";
const SUSPICIOUS_COLOR: &str = "#f59e0b";
const MALICIOUS_COLOR: &str = "#ef4444";
const EMPTY_COLOR: &str = "#334155";

/// clean / suspicious / malicious の比率でグラデーションを作る
///
/// 各件数は独立に数えられているため、3つの合計に対する比率で描く。
pub fn chart_gradient(counts: &AggregateCounts) -> String {
    let sum = counts.clean + counts.suspicious + counts.threat;
    if sum == 0 {
        return format!("conic-gradient({} 0deg 360deg)", EMPTY_COLOR);
    }

    let clean_end = 360.0 * counts.clean as f64 / sum as f64;
    let suspicious_end = clean_end + 360.0 * counts.suspicious as f64 / sum as f64;
    format!(
        "conic-gradient({} 0deg {:.1}deg, {} {:.1}deg {:.1}deg, {} {:.1}deg 360deg)",
        CLEAN_COLOR,
        clean_end,
        SUSPICIOUS_COLOR,
        clean_end,
        suspicious_end,
        MALICIOUS_COLOR,
        suspicious_end
    )
}

#[component]
pub fn ThreatChart(counts: RwSignal<AggregateCounts>) -> impl IntoView {
    view! {
        <div class="threat-chart">
            <div
                class="donut"
                style=move || format!("background: {}", counts.with(chart_gradient))
            >
                <div class="donut-hole">{move || counts.with(|c| c.total)}</div>
            </div>
            <ul class="legend">
                <li><span class="swatch clean"></span>"Clean " {move || counts.with(|c| c.clean)}</li>
                <li><span class="swatch suspicious"></span>"Suspicious " {move || counts.with(|c| c.suspicious)}</li>
                <li><span class="swatch malicious"></span>"Malicious " {move || counts.with(|c| c.threat)}</li>
            </ul>
        </div>
    }
}
