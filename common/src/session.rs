//! セッション状態
//!
//! 選択中のファイルとそのダイジェスト。ファイルが変わるたびに
//! `selection_id` を進め、古い選択に対するダイジェスト結果を破棄できるようにする。

use crate::file::SelectedFile;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    selected_file: Option<SelectedFile>,
    selected_file_hash: Option<String>,
    selection_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn selected_file_hash(&self) -> Option<&str> {
        self.selected_file_hash.as_deref()
    }

    pub fn selection_id(&self) -> u64 {
        self.selection_id
    }

    /// ファイルを選択（ハッシュはクリア）
    pub(crate) fn select(&mut self, file: SelectedFile) -> u64 {
        self.selected_file = Some(file);
        self.selected_file_hash = None;
        self.selection_id += 1;
        self.selection_id
    }

    /// 現在の選択に対するハッシュのみ受け付ける
    pub(crate) fn set_hash(&mut self, selection_id: u64, hash: String) -> bool {
        if selection_id != self.selection_id || self.selected_file.is_none() {
            return false;
        }
        self.selected_file_hash = Some(hash);
        true
    }
}
