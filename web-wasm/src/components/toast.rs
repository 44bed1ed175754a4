//! 通知トースト（5秒で自動的に消える）

use leptos::prelude::*;
use scan_dashboard_common::Notification;

#[component]
pub fn Toasts(toasts: RwSignal<Vec<Notification>>) -> impl IntoView {
    view! {
        <div class="toast-container">
            {move || {
                toasts
                    .get()
                    .into_iter()
                    .map(|n| {
                        let class = format!("toast toast-{}", n.level.title().to_lowercase());
                        view! {
                            <div class=class>
                                <strong>{n.level.title()}</strong>
                                <span>{n.message}</span>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
