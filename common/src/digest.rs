//! SHA-256ダイジェスト計算

use crate::error::DigestError;
use crate::file::SelectedFile;
use sha2::{Digest, Sha256};

/// 16進ダイジェストの文字数（256bit）
pub const DIGEST_HEX_LEN: usize = 64;

/// バイト列のSHA-256を小文字16進で返す
///
/// # Examples
/// ```
/// use scan_dashboard_common::compute_digest;
///
/// let hex = compute_digest(b"abc");
/// assert_eq!(hex, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
/// ```
pub fn compute_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// ファイル内容全体を読み込んでダイジェストを計算
pub fn digest_file(file: &SelectedFile) -> Result<String, DigestError> {
    let bytes = file.read_bytes()?;
    Ok(compute_digest(&bytes))
}
