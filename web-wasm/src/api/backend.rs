//! スキャンAPI連携（fetch）
//!
//! `window.fetch` でバックエンドを呼び出す `ScanApi` 実装。
//! 送信は multipart/form-data の `file` フィールド。

use scan_dashboard_common::api::endpoint;
use scan_dashboard_common::{
    ApiError, BackendStats, BackendStatus, ScanApi, ScanResult, SelectedFile,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Request, RequestInit, RequestMode, Response};

#[derive(Debug, Clone)]
pub struct FetchApi {
    base_url: String,
}

impl FetchApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, opts: &RequestInit) -> Result<T, ApiError> {
        let url = endpoint(&self.base_url, path);
        let request = Request::new_with_str_and_init(&url, opts).map_err(network_error)?;

        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network_error)?;
        let resp: Response = resp_value.dyn_into().map_err(network_error)?;

        if !resp.ok() {
            return Err(ApiError::Status(resp.status()));
        }

        let text = JsFuture::from(resp.text().map_err(network_error)?)
            .await
            .map_err(network_error)?
            .as_string()
            .unwrap_or_default();
        parse_body(&text)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        self.send(path, &opts).await
    }
}

/// 本文をJSONとして解釈（失敗は Malformed）
pub fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Malformed(e.to_string()))
}

/// JS例外のメッセージ（"Failed to fetch" など）を取り出す
pub fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn network_error(value: JsValue) -> ApiError {
    ApiError::Network(js_error_message(&value))
}

fn build_form(file: &SelectedFile) -> Result<FormData, ApiError> {
    let bytes = file.read_bytes().map_err(|e| ApiError::Read(e.to_string()))?;
    let array = js_sys::Uint8Array::from(bytes.as_slice());
    let parts = js_sys::Array::of1(&array);
    let blob = Blob::new_with_u8_array_sequence(&parts).map_err(network_error)?;

    let form = FormData::new().map_err(network_error)?;
    form.append_with_blob_and_filename("file", &blob, file.name())
        .map_err(network_error)?;
    Ok(form)
}

impl ScanApi for FetchApi {
    async fn status(&self) -> Result<BackendStatus, ApiError> {
        self.get("status").await
    }

    async fn submit_scan(&self, file: &SelectedFile) -> Result<ScanResult, ApiError> {
        let form = build_form(file)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&form);
        self.send("scan", &opts).await
    }

    async fn history(&self) -> Result<Value, ApiError> {
        self.get("history").await
    }

    async fn stats(&self) -> Result<BackendStats, ApiError> {
        let value: Value = self.get("stats").await?;
        BackendStats::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn eicar_test(&self) -> Result<ScanResult, ApiError> {
        self.get("test/eicar").await
    }
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_form_contains_file_field() {
        let file = SelectedFile::from_bytes("eicar.com", b"payload".to_vec());
        let form = build_form(&file).expect("form build failed");

        assert!(form.has("file"));
    }
}
