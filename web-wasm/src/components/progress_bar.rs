//! プログレスバーコンポーネント

use leptos::prelude::*;
use scan_dashboard_common::ProgressIndicator;

#[component]
pub fn ProgressBar(progress: RwSignal<ProgressIndicator>) -> impl IntoView {
    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    class="progress-fill"
                    style=move || format!("width: {}%", progress.with(|p| p.percent()))
                />
            </div>
            <p class="progress-text">
                {move || progress.with(|p| format!("{} {}%", p.label(), p.percent()))}
            </p>
        </div>
    }
}
