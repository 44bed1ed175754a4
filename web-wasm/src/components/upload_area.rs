//! アップロードエリアコンポーネント
//!
//! クリックまたはドラッグ&ドロップで1ファイルずつ選択する。

use leptos::html;
use leptos::prelude::*;
use scan_dashboard_common::{format_file_size, MAX_FILE_SIZE};
use web_sys::{DragEvent, File, HtmlInputElement};

#[component]
pub fn UploadArea<F>(on_file_selected: F) -> impl IntoView
where
    F: Fn(File) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref: NodeRef<html::Input> = NodeRef::new();

    let on_drop = {
        let on_file_selected = on_file_selected.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if let Some(file) = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0))
            {
                on_file_selected(file);
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            on_file_selected(file);
        }
        // 同じファイルを再選択できるように
        input.set_value("");
    };

    view! {
        <input type="file" class="hidden" node_ref=input_ref on:change=on_change />
        <div
            class=move || {
                if is_dragover.get() {
                    "upload-area dragover"
                } else {
                    "upload-area"
                }
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <div class="upload-icon">"📄"</div>
            <p>"Drop a file here or click to select"</p>
            <p class="text-muted">{format!("Max {}", format_file_size(MAX_FILE_SIZE))}</p>
        </div>
    }
}
