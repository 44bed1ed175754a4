//! メインアプリケーションコンポーネント

use crate::api::FetchApi;
use crate::components::{
    file_info::FileInfoPanel, header::Header, progress_bar::ProgressBar,
    results_table::ResultsTable, threat_chart::ThreatChart, toast::Toasts,
    upload_area::UploadArea,
};
use crate::state::DashboardState;
use leptos::prelude::*;
use scan_dashboard_common::{Phase, DEFAULT_API_URL};

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let api = FetchApi::new(DEFAULT_API_URL);
    let api_url = api.base_url().to_string();
    let state = DashboardState::new(api);

    // 起動時にステータス確認と履歴読み込み
    state.check_status();
    state.load_history();

    let on_file_selected = move |file: web_sys::File| state.select_file(file);
    let on_scan = move |_| state.start_scan();
    let on_eicar = move |_| state.run_eicar_check();
    let on_copy = move || state.copy_hash();

    let is_scanning = move || state.phase.get() == Phase::Scanning;

    view! {
        <div class="container">
            <Header health=state.health api_url=api_url />

            <div class="grid">
                <section class="panel">
                    <UploadArea on_file_selected=on_file_selected />
                    <FileInfoPanel file_info=state.file_info phase=state.phase on_copy=on_copy />

                    <div class="actions">
                        <button
                            class="btn btn-primary"
                            disabled=move || !state.can_scan.get()
                            on:click=on_scan
                        >
                            {move || if is_scanning() { "Scanning..." } else { "Start scan" }}
                        </button>
                        <button class="btn" disabled=is_scanning on:click=on_eicar>
                            "EICAR self-test"
                        </button>
                    </div>

                    <Show when=is_scanning>
                        <ProgressBar progress=state.progress />
                    </Show>
                </section>

                <section class="panel">
                    <ThreatChart counts=state.counts />
                </section>
            </div>

            <ResultsTable results=state.results />
            <Toasts toasts=state.toasts />
        </div>
    }
}
