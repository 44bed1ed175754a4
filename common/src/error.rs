//! エラー型定義
//!
//! - DigestError: ダイジェスト計算の失敗
//! - ApiError: バックエンド呼び出しの失敗
//! - OrchestratorError: スキャン操作の前提条件違反

use thiserror::Error;

/// ダイジェスト計算エラー
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("failed to read file content: {0}")]
    Read(#[from] std::io::Error),

    /// ブラウザなど、io以外の経路で内容を取得できなかった
    #[error("file content unavailable: {0}")]
    Unavailable(String),
}

/// バックエンドAPIエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 通信失敗（メッセージはトランスポートのものをそのまま保持）
    #[error("{0}")]
    Network(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("could not read file: {0}")]
    Read(String),
}

/// オーケストレータ操作エラー
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("file \"{name}\" is too large ({size} bytes, max 32 MB)")]
    FileTooLarge { name: String, size: u64 },

    #[error("no file selected")]
    NoFileSelected,

    #[error(transparent)]
    Digest(#[from] DigestError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, OrchestratorError>;
