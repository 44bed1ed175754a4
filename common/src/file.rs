//! 選択ファイル
//!
//! パス参照（CLI）とメモリ上のバイト列（Web・テスト）の両方を扱う。
//! パス参照の場合、サイズはメタデータから取得するため、上限超過ファイルは読み込まれない。

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// アップロード可能な最大サイズ（スキャンプロバイダの上限に合わせる）
pub const MAX_FILE_SIZE: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
enum FileContent {
    Memory(Arc<[u8]>),
    Path(PathBuf),
}

/// ユーザーが選択した1ファイル
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    content: FileContent,
}

impl SelectedFile {
    /// メモリ上のバイト列から生成
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content: FileContent::Memory(bytes),
        }
    }

    /// ファイルパスから生成（内容はまだ読まない）
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            content: FileContent::Path(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            FileContent::Path(path) => Some(path),
            FileContent::Memory(_) => None,
        }
    }

    pub fn exceeds_limit(&self) -> bool {
        self.size > MAX_FILE_SIZE
    }

    /// 内容をすべて読み込む
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Memory(bytes) => Ok(bytes.to_vec()),
            FileContent::Path(path) => std::fs::read(path),
        }
    }
}

/// ファイルサイズを表示用に整形（例: "1.5 KB"）
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
