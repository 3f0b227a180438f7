//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use crate::api::OutputStyle;
use crate::error::XlsxToJsonError;
use crate::output::{OutputFormatter, DEFAULT_INDENT};
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::sheet::convert_sheet;
use crate::types::Document;
use std::io::{Read, Seek, Write};
use tracing::debug;

/// インデント幅の上限
const MAX_INDENT: usize = 16;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversionConfig {
    /// 出力スタイル
    pub output_style: OutputStyle,

    /// 整形済み出力のインデント幅
    pub indent: usize,

    /// 入力サイズの制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_style: OutputStyle::Pretty,
            indent: DEFAULT_INDENT,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2json::{ConverterBuilder, OutputStyle};
///
/// # fn main() -> Result<(), xlsx2json::XlsxToJsonError> {
/// let converter = ConverterBuilder::new()
///     .with_output_style(OutputStyle::Pretty)
///     .with_indent(2)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力スタイル: 整形済みJSON
    /// - インデント幅: 4スペース
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// JSONの出力スタイルを指定する
    pub fn with_output_style(mut self, style: OutputStyle) -> Self {
        self.config.output_style = style;
        self
    }

    /// 整形済み出力のインデント幅を指定する
    ///
    /// # 制約
    ///
    /// * `1..=16`の範囲でなければならない
    /// * 制約違反の場合、`build()`時に`XlsxToJsonError::Config`を返す
    pub fn with_indent(mut self, width: usize) -> Self {
        self.config.indent = width;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxToJsonError::Config(String)`: 設定の検証に失敗した場合
    ///   * インデント幅が`1..=16`の範囲外
    ///   * 入力サイズ上限が0
    pub fn build(self) -> Result<Converter, XlsxToJsonError> {
        if self.config.indent == 0 || self.config.indent > MAX_INDENT {
            return Err(XlsxToJsonError::Config(format!(
                "Invalid indent width: {} (expected 1..={})",
                self.config.indent, MAX_INDENT
            )));
        }

        if self.config.security.max_input_file_size == 0 {
            return Err(XlsxToJsonError::Config(
                "Invalid max input size: must be greater than 0".to_string(),
            ));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートの最初のシートを、フィールド順序を保持したJSONに変換します。
/// `Converter`は状態を持たないため、同じインスタンスで何度でも変換できます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2json::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), xlsx2json::XlsxToJsonError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("Weapon.xlsx")?;
/// let output = File::create("Weapon.json")?;
/// converter.convert(input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
    formatter: OutputFormatter,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            formatter: OutputFormatter::from_style(config.output_style, config.indent),
            config,
        }
    }

    /// 文字列グリッドを`Document`に変換する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Document)` - 変換結果
    /// * `Err(XlsxToJsonError::EmptySheet)` - グリッドに行が存在しない場合
    pub fn convert_document<S: AsRef<str>>(
        &self,
        rows: &[Vec<S>],
    ) -> Result<Document, XlsxToJsonError> {
        let document = convert_sheet(rows)?;
        debug!(
            fields = document.header().len(),
            records = document.len(),
            "Converted sheet"
        );
        Ok(document)
    }

    /// 文字列グリッドをJSON文字列に変換する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsx2json::{ConverterBuilder, OutputStyle};
    ///
    /// let converter = ConverterBuilder::new()
    ///     .with_output_style(OutputStyle::Compact)
    ///     .build()
    ///     .unwrap();
    /// let rows = vec![
    ///     vec!["Name", "TagsArray", "Level"],
    ///     vec!["Hero", "fire\nwater", "5"],
    /// ];
    /// let json = converter.convert_rows(&rows).unwrap();
    /// assert_eq!(
    ///     json,
    ///     "[{\"Name\":\"Hero\",\"TagsArray\":[\"fire\",\"water\"],\"Level\":\"5\"}]\n"
    /// );
    /// ```
    pub fn convert_rows<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<String, XlsxToJsonError> {
        let document = self.convert_document(rows)?;
        self.formatter.render_to_string(&document)
    }

    /// スプレッドシートをJSON形式に変換
    ///
    /// # 引数
    ///
    /// * `input` - スプレッドシートを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `output` - JSON出力先のライター（Writeトレイトを実装）
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込み、ワークブックとして開く
    /// 2. 最初のシートを文字列グリッドとして取り出す
    /// 3. レコードを構築し、JSONを生成する
    /// 4. 生成済みのJSONを一括で出力する
    ///
    /// JSONの生成が完了するまで`output`には何も書き込みません。
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<(), XlsxToJsonError> {
        let json = self.convert_to_string(input)?;
        output.write_all(json.as_bytes())?;
        output.flush()?;
        Ok(())
    }

    /// スプレッドシートをJSON形式の文字列に変換
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, XlsxToJsonError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        debug!(sheets = ?parser.get_sheet_names(), "Opened workbook");

        let rows = parser.first_sheet_rows()?;
        self.convert_rows(&rows)
    }
}
