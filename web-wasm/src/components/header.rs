//! ヘッダーコンポーネント（APIステータス表示）

use leptos::prelude::*;
use scan_dashboard_common::ApiHealth;

fn status_text(health: Option<&ApiHealth>) -> (&'static str, &'static str) {
    match health {
        None => ("status-pending", "Checking API..."),
        Some(ApiHealth::Online { database_connected: true }) => ("status-online", "System active"),
        Some(ApiHealth::Online { database_connected: false }) => {
            ("status-online", "System active (demo mode)")
        }
        Some(ApiHealth::Offline { .. }) => ("status-offline", "API offline"),
    }
}

#[component]
pub fn Header(health: RwSignal<Option<ApiHealth>>, api_url: String) -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Scan Dashboard"</h1>
            <div class="api-status">
                <span class=move || {
                    format!("status-dot {}", health.with(|h| status_text(h.as_ref()).0))
                }></span>
                <span>{move || health.with(|h| status_text(h.as_ref()).1)}</span>
                <span class="text-muted">{api_url}</span>
            </div>
        </header>
    }
}
