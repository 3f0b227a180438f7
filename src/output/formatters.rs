//! Output Formatters Implementation
//!
//! 各出力スタイルの実装を提供するモジュール。

use crate::error::XlsxToJsonError;
use crate::types::Document;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// 整形済みJSONのフォーマッター
///
/// 各レコードは複数行にわたり、1行に1つの`"key": value`を出力します。
/// キーの順序は`Record`の`Serialize`実装が保証します。
pub struct PrettyJsonFormatter {
    pub indent: usize,
}

impl PrettyJsonFormatter {
    pub fn render<W: Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), XlsxToJsonError> {
        let indent = vec![b' '; self.indent];
        let formatter = PrettyFormatter::with_indent(&indent);
        let mut serializer = Serializer::with_formatter(&mut *writer, formatter);
        document.serialize(&mut serializer)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// 1行のJSONを出力するフォーマッター
pub struct CompactJsonFormatter;

impl CompactJsonFormatter {
    pub fn render<W: Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), XlsxToJsonError> {
        serde_json::to_writer(&mut *writer, document)?;
        writeln!(writer)?;
        Ok(())
    }
}
