//! Batch Module
//!
//! ディレクトリ内のスプレッドシートを順番に変換し、1ファイルにつき1つの
//! JSONファイルを書き出すバッチ処理。
//!
//! 1ファイルの失敗はバッチ全体を止めません。失敗したファイルはログに記録して
//! スキップし、出力ファイルは一切残しません。

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::builder::Converter;
use crate::error::XlsxToJsonError;

/// 入出力ディレクトリの既定値
pub const DEFAULT_CONFIG_DIR: &str = "./assets/resources/config";

/// 既定の入力拡張子
pub const DEFAULT_EXTENSION: &str = "xlsx";

/// Officeのロックファイル・一時ファイルを示す接頭辞
pub const DEFAULT_RESERVED_PREFIX: &str = "~";

/// バッチ処理の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// 入力スプレッドシートのディレクトリ
    pub input_dir: PathBuf,

    /// JSONの出力先ディレクトリ（存在しない場合は作成する）
    pub output_dir: PathBuf,

    /// 対象とするファイルの拡張子（大文字小文字を区別）
    pub extension: String,

    /// この接頭辞で始まるファイルはスキップする
    pub reserved_prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            output_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
        }
    }
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// ファイル名が変換対象かどうかを判定する
    ///
    /// `reserved_prefix`が空の場合は接頭辞による除外を行いません。
    pub fn accepts(&self, file_name: &str) -> bool {
        if !self.reserved_prefix.is_empty() && file_name.starts_with(&self.reserved_prefix) {
            return false;
        }
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

/// 変換に成功したファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// スキップされたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub source: PathBuf,
    pub reason: String,
}

/// バッチ処理の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: Vec<ConvertedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl BatchReport {
    /// すべてのファイルが変換された場合に`true`
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// 入力ディレクトリから変換対象のファイルを列挙する
///
/// ディレクトリは対象外です。処理順序を一定にするため、パスでソートして返します。
pub fn discover_inputs(config: &BatchConfig) -> Result<Vec<PathBuf>, XlsxToJsonError> {
    let mut inputs = Vec::new();

    for entry in fs::read_dir(&config.input_dir)? {
        let entry = entry?;
        let path = entry.path();

        // シンボリックリンクはリンク先で判定する（リンク切れはスキップ）
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            _ => continue,
        }

        // UTF-8以外のファイル名は置換文字を含む名前で判定する
        if config.accepts(&entry.file_name().to_string_lossy()) {
            inputs.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-input file");
        }
    }

    inputs.sort();
    Ok(inputs)
}

/// 入力ファイルに対応する出力パス（`<output_dir>/<stem>.json`）
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut file_name = stem.to_os_string();
    file_name.push(".json");
    output_dir.join(file_name)
}

/// 1ファイルを変換して書き出す
///
/// 一時ファイルに書き込んでから出力パスへリネームするため、
/// 失敗時に不完全なJSONファイルが残ることはありません。
pub fn convert_file(
    converter: &Converter,
    input: &Path,
    destination: &Path,
) -> Result<(), XlsxToJsonError> {
    let json = converter.convert_to_string(File::open(input)?)?;

    let mut temp_name = destination.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    if let Err(e) = fs::write(&temp_path, json.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, destination) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// バッチ処理を実行する
///
/// # 戻り値
///
/// * `Ok(BatchReport)` - 各ファイルの成否
/// * `Err(XlsxToJsonError::Io)` - 出力ディレクトリの作成、または入力ディレクトリの
///   走査に失敗した場合
pub fn run(converter: &Converter, config: &BatchConfig) -> Result<BatchReport, XlsxToJsonError> {
    fs::create_dir_all(&config.output_dir)?;

    let inputs = discover_inputs(config)?;
    info!(
        count = inputs.len(),
        input_dir = %config.input_dir.display(),
        "Found spreadsheets"
    );

    let mut report = BatchReport::default();
    for source in inputs {
        let destination = output_path_for(&source, &config.output_dir);

        match convert_file(converter, &source, &destination) {
            Ok(()) => {
                info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Exported"
                );
                report.converted.push(ConvertedFile {
                    source,
                    destination,
                });
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Skipping file");
                report.skipped.push(SkippedFile {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
