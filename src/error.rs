//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsx2jsonクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、レコード変換、JSONシリアライズ中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み・書き込み失敗など）
/// - `Parse`: スプレッドシートの解析中に発生したエラー（calamine由来）
/// - `Zip`: XLSXのZIPアーカイブの読み込みに失敗したエラー
/// - `Xml`: XLSX内部のXML（書式情報）の解析に失敗したエラー
/// - `NoWorksheet`: ワークブックにシートが1枚も存在しない
/// - `EmptySheet`: 最初のシートに行が1行も存在しない（ヘッダー行なし）
/// - `Serialization`: JSONへの変換に失敗したエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズ制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2json::{ConverterBuilder, XlsxToJsonError};
///
/// let converter = ConverterBuilder::new().build().unwrap();
/// match converter.convert_rows::<String>(&[]) {
///     Err(XlsxToJsonError::EmptySheet) => println!("skipped"),
///     other => println!("{:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToJsonError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー
    ///
    /// 入力がワークブックとして開けない場合（破損、未対応形式など）に発生します。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// XLSXの書式情報を読み込む際に発生します。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XML解析エラー
    ///
    /// `xl/styles.xml`やワークシートXMLが不正な場合に発生します。
    #[error("XML parse error: {0}")]
    Xml(String),

    /// ワークブックにシートが存在しない
    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    /// 最初のシートに行が存在しない
    ///
    /// ヘッダー行すら存在しないため、レコードを構築できません。
    /// バッチ処理ではこのファイルのみスキップされます。
    #[error("Sheet is empty: no header row")]
    EmptySheet,

    /// JSONへのシリアライズに失敗したエラー
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsx2json::{ConverterBuilder, XlsxToJsonError};
    ///
    /// let result = ConverterBuilder::new().with_indent(0).build();
    ///
    /// match result {
    ///     Err(XlsxToJsonError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxToJsonError = io_err.into();

        match error {
            XlsxToJsonError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxToJsonError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse spreadsheet"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: XlsxToJsonError = json_err.into();

        assert!(matches!(error, XlsxToJsonError::Serialization(_)));
        assert!(error.to_string().starts_with("JSON serialization error"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxToJsonError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxToJsonError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxToJsonError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        assert_eq!(
            XlsxToJsonError::EmptySheet.to_string(),
            "Sheet is empty: no header row"
        );
        assert_eq!(
            XlsxToJsonError::NoWorksheet.to_string(),
            "Workbook contains no worksheet"
        );

        let config_err = XlsxToJsonError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let zip_err = XlsxToJsonError::Zip("bad archive".to_string());
        assert_eq!(zip_err.to_string(), "ZIP archive error: bad archive");

        let xml_err = XlsxToJsonError::Xml("unexpected end".to_string());
        assert_eq!(xml_err.to_string(), "XML parse error: unexpected end");

        let security_err = XlsxToJsonError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
    }
}
