//! Output Format Module
//!
//! `Document`をJSONテキストに変換するモジュール。
//! Strategy Patternにより、整形済み出力と1行出力を切り替えます。

mod formatters;

use crate::api::OutputStyle;
use crate::error::XlsxToJsonError;
use crate::types::Document;
use std::io::Write;

pub use formatters::*;

/// 既定のインデント幅
pub const DEFAULT_INDENT: usize = 4;

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatter {
    Pretty { indent: usize },
    Compact,
}

impl OutputFormatter {
    /// 出力スタイルからフォーマッターを生成
    pub fn from_style(style: OutputStyle, indent: usize) -> Self {
        match style {
            OutputStyle::Pretty => OutputFormatter::Pretty { indent },
            OutputStyle::Compact => OutputFormatter::Compact,
        }
    }

    /// `Document`を指定されたスタイルで出力する
    ///
    /// # 引数
    ///
    /// * `document` - 出力するドキュメント
    /// * `writer` - 出力先のライター
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(XlsxToJsonError)` - エラーが発生した場合
    pub fn render<W: Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), XlsxToJsonError> {
        match *self {
            OutputFormatter::Pretty { indent } => {
                PrettyJsonFormatter { indent }.render(document, writer)
            }
            OutputFormatter::Compact => CompactJsonFormatter.render(document, writer),
        }
    }

    /// `Document`を文字列として出力する
    pub fn render_to_string(&self, document: &Document) -> Result<String, XlsxToJsonError> {
        let mut buffer = Vec::new();
        self.render(document, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| {
            XlsxToJsonError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        OutputFormatter::Pretty {
            indent: DEFAULT_INDENT,
        }
    }
}

/// `Document`を既定の形式（4スペースインデントの整形済みJSON）で文字列化する
///
/// 各オブジェクトのキーはヘッダー行の順序で出力されます。
///
/// # 使用例
///
/// ```rust
/// use xlsx2json::{convert_sheet, serialize_document};
///
/// let rows = vec![vec!["Name", "TagsArray"], vec!["Hero", "fire"]];
/// let document = convert_sheet(&rows).unwrap();
/// let json = serialize_document(&document).unwrap();
/// assert!(json.find("\"Name\"").unwrap() < json.find("\"TagsArray\"").unwrap());
/// ```
pub fn serialize_document(document: &Document) -> Result<String, XlsxToJsonError> {
    OutputFormatter::default().render_to_string(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::convert_sheet;

    fn hero_document() -> Document {
        let rows = vec![
            vec!["Name", "TagsArray", "Level"],
            vec!["Hero", "fire\nwater", "5"],
        ];
        convert_sheet(&rows).unwrap()
    }

    #[test]
    fn test_pretty_output_layout() {
        let json = serialize_document(&hero_document()).unwrap();
        let expected = "[\n    {\n        \"Name\": \"Hero\",\n        \"TagsArray\": [\n            \"fire\",\n            \"water\"\n        ],\n        \"Level\": \"5\"\n    }\n]\n";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_compact_output() {
        let json = OutputFormatter::Compact
            .render_to_string(&hero_document())
            .unwrap();
        assert_eq!(
            json,
            "[{\"Name\":\"Hero\",\"TagsArray\":[\"fire\",\"water\"],\"Level\":\"5\"}]\n"
        );
    }

    #[test]
    fn test_custom_indent() {
        let json = OutputFormatter::Pretty { indent: 2 }
            .render_to_string(&hero_document())
            .unwrap();
        assert!(json.starts_with("[\n  {\n    \"Name\": \"Hero\","));
    }

    #[test]
    fn test_empty_document_is_empty_array() {
        let document = convert_sheet(&[vec!["Name", "TagsArray"]]).unwrap();
        assert_eq!(serialize_document(&document).unwrap(), "[]\n");
    }

    #[test]
    fn test_empty_array_field_renders_inline() {
        let document = convert_sheet(&[vec!["TagsArray"], vec![""]]).unwrap();
        let json = serialize_document(&document).unwrap();
        assert!(json.contains("\"TagsArray\": []"));
    }

    #[test]
    fn test_field_order_is_not_sorted() {
        let document = convert_sheet(&[vec!["b", "a", "c"], vec!["1", "2", "3"]]).unwrap();
        let json = OutputFormatter::Compact.render_to_string(&document).unwrap();
        assert_eq!(json, "[{\"b\":\"1\",\"a\":\"2\",\"c\":\"3\"}]\n");
    }

    #[test]
    fn test_duplicate_header_names_are_kept() {
        let document = convert_sheet(&[vec!["Id", "Id"], vec!["1", "2"]]).unwrap();
        let json = OutputFormatter::Compact.render_to_string(&document).unwrap();
        assert_eq!(json, "[{\"Id\":\"1\",\"Id\":\"2\"}]\n");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let document = convert_sheet(&[vec!["Quote"], vec!["say \"hi\"\t\\"]]).unwrap();
        let json = OutputFormatter::Compact.render_to_string(&document).unwrap();
        assert_eq!(json, "[{\"Quote\":\"say \\\"hi\\\"\\t\\\\\"}]\n");

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["Quote"], "say \"hi\"\t\\");
    }

    #[test]
    fn test_non_ascii_is_written_verbatim() {
        let document = convert_sheet(&[vec!["名前"], vec!["勇者"]]).unwrap();
        let json = OutputFormatter::Compact.render_to_string(&document).unwrap();
        assert_eq!(json, "[{\"名前\":\"勇者\"}]\n");
    }

    #[test]
    fn test_output_is_deterministic() {
        let first = serialize_document(&hero_document()).unwrap();
        let second = serialize_document(&hero_document()).unwrap();
        assert_eq!(first, second);
    }
}
