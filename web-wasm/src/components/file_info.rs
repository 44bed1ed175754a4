//! 選択中ファイルの情報パネル

use crate::state::FileInfo;
use leptos::prelude::*;
use scan_dashboard_common::{format_file_size, Phase};

#[component]
pub fn FileInfoPanel<F>(
    file_info: RwSignal<Option<FileInfo>>,
    phase: RwSignal<Phase>,
    on_copy: F,
) -> impl IntoView
where
    F: Fn() + Copy + Send + Sync + 'static,
{
    let has_hash = move || file_info.with(|f| f.as_ref().is_some_and(|f| f.hash.is_some()));
    let hash_text = move || {
        let hash = file_info.with(|f| f.as_ref().and_then(|f| f.hash.clone()));
        match (hash, phase.get()) {
            (Some(hash), _) => hash,
            (None, Phase::HashComputing) => "Computing...".to_string(),
            (None, _) => "-".to_string(),
        }
    };

    view! {
        <Show when=move || file_info.with(|f| f.is_some())>
            <div class="file-info">
                <div class="file-name">
                    {move || file_info.with(|f| f.as_ref().map(|f| f.name.clone()).unwrap_or_default())}
                </div>
                <div class="file-size">
                    {move || file_info.with(|f| f.as_ref().map(|f| format_file_size(f.size)).unwrap_or_default())}
                </div>
                <div class="file-hash">
                    <span class="label">"SHA-256: "</span>
                    <code>{hash_text}</code>
                    <Show when=has_hash>
                        <button class="btn btn-small" title="Copy hash" on:click=move |_| on_copy()>
                            "Copy"
                        </button>
                    </Show>
                </div>
            </div>
        </Show>
    }
}
