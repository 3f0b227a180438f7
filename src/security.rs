//! Security Module
//!
//! 入力サイズの制限と、ZIPアーカイブ内のパス検証を実装するモジュール。

use crate::error::XlsxToJsonError;
use std::io::Read;

/// 入力ファイルの既定の最大サイズ: 2GB
pub const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 2_147_483_648;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: DEFAULT_MAX_INPUT_FILE_SIZE,
        }
    }
}

impl SecurityConfig {
    /// 入力全体をメモリに読み込む
    ///
    /// 上限を1バイトでも超えた時点で読み込みを打ち切ります。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<u8>)` - 入力のバイト列
    /// * `Err(XlsxToJsonError::SecurityViolation)` - 入力が上限を超えた場合
    /// * `Err(XlsxToJsonError::Io)` - 読み込みに失敗した場合
    pub fn read_input<R: Read>(&self, reader: R) -> Result<Vec<u8>, XlsxToJsonError> {
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(self.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(XlsxToJsonError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }

        Ok(buffer)
    }
}

/// ZIPアーカイブ内のパスを検証
///
/// ワークブックのリレーションシップから解決したパスに対して使用します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - 空、絶対パス、`..`、バックスラッシュを含む場合
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.starts_with('/') || path.get(1..3) == Some(":\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
