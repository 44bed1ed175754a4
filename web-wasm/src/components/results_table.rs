//! 結果テーブル（新しい順に最大10件）

use leptos::prelude::*;
use scan_dashboard_common::{classify, ScanResult};

#[component]
pub fn ResultsTable(results: RwSignal<Vec<ScanResult>>) -> impl IntoView {
    view! {
        <div class="results">
            <h2>"Recent scans"</h2>
            <Show
                when=move || results.with(|r| !r.is_empty())
                fallback=|| view! { <p class="text-muted">"No scans yet"</p> }
            >
                <table class="results-table">
                    <thead>
                        <tr>
                            <th>"Status"</th>
                            <th>"File"</th>
                            <th>"Primary"</th>
                            <th>"Secondary"</th>
                            <th>"Time"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            results
                                .get()
                                .into_iter()
                                .map(|result| {
                                    let verdict = classify(&result);
                                    let class = format!("badge {}", verdict.label().to_lowercase());
                                    view! {
                                        <tr>
                                            <td><span class=class>{verdict.label()}</span></td>
                                            <td class="filename" title=result.hash.clone()>
                                                {result.filename.clone()}
                                            </td>
                                            <td>{result.primary_summary()}</td>
                                            <td>{result.secondary_summary()}</td>
                                            <td>{result.time_label()}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>
            </Show>
        </div>
    }
}
