//! スキャンAPIのHTTPクライアント（reqwest）

use crate::config::Config;
use crate::error::Result;
use reqwest::multipart::{Form, Part};
use scan_dashboard_common::api::endpoint;
use scan_dashboard_common::{
    ApiError, BackendStats, BackendStatus, ScanApi, ScanResult, SelectedFile,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpScanApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScanApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, config.timeout_seconds.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ApiError> {
        let url = endpoint(&self.base_url, path);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(network_error)?;
        read_json(response).await
    }
}

fn network_error(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

/// 2xx以外はステータスエラー、本文がJSONとして読めなければ Malformed
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }

    let body = response.bytes().await.map_err(network_error)?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}

impl ScanApi for HttpScanApi {
    async fn status(&self) -> std::result::Result<BackendStatus, ApiError> {
        self.get_json("status").await
    }

    async fn submit_scan(&self, file: &SelectedFile) -> std::result::Result<ScanResult, ApiError> {
        let bytes = match file.path() {
            Some(path) => tokio::fs::read(path).await,
            None => file.read_bytes(),
        }
        .map_err(|e| ApiError::Read(e.to_string()))?;

        let part = Part::bytes(bytes)
            .file_name(file.name().to_string())
            .mime_str("application/octet-stream")
            .map_err(network_error)?;
        let form = Form::new().part("file", part);

        let url = endpoint(&self.base_url, "scan");
        tracing::debug!(%url, file = file.name(), size = file.size(), "POST multipart");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn history(&self) -> std::result::Result<Value, ApiError> {
        self.get_json("history").await
    }

    async fn stats(&self) -> std::result::Result<BackendStats, ApiError> {
        let value: Value = self.get_json("stats").await?;
        BackendStats::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn eicar_test(&self) -> std::result::Result<ScanResult, ApiError> {
        self.get_json("test/eicar").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpScanApi::new("http://localhost:5000/api/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn test_from_config_uses_api_url() {
        let config = Config {
            api_url: "http://scanner.local:8080/api".into(),
            timeout_seconds: Some(30),
            ..Default::default()
        };
        let api = HttpScanApi::from_config(&config).unwrap();
        assert_eq!(api.base_url(), "http://scanner.local:8080/api");
    }
}
