//! Sheet Conversion Module
//!
//! 文字列セルのグリッド（ヘッダー行 + データ行）から、フィールド順序を保持した
//! レコードのリストを構築するモジュール。
//!
//! # 変換規則
//!
//! - 1行目をヘッダーとし、各列名から`FieldKind`を判定する
//! - 配列フィールド: 空または空白のみのセル → `[]`、改行を含むセル → 改行で分割、
//!   それ以外 → 1要素の配列
//! - スカラーフィールド: セルの文字列をそのまま使用（トリムや型変換はしない）
//! - ヘッダーより短い行の欠損セルは、空セルと同じ既定値になる

use crate::error::XlsxToJsonError;
use crate::types::{Document, FieldKind, FieldValue, Header, Record};

/// グリッドの1行目からヘッダーを構築する
///
/// # 戻り値
///
/// * `Ok(Header)` - ヘッダー
/// * `Err(XlsxToJsonError::EmptySheet)` - グリッドに行が存在しない場合
pub fn build_header<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Header, XlsxToJsonError> {
    let first = rows.first().ok_or(XlsxToJsonError::EmptySheet)?;
    Ok(Header::new(first.iter().map(|cell| cell.as_ref())))
}

/// フィールド名からフィールドの型を判定する
pub fn classify_field(field_name: &str) -> FieldKind {
    FieldKind::classify(field_name)
}

/// ヘッダーとデータ行から1件のレコードを構築する
///
/// 副作用はありません。レコードのフィールド順序は常にヘッダーの順序と一致します。
/// ヘッダーより長い行の余分なセルは無視されます。
pub fn build_record<S: AsRef<str>>(header: &Header, row: &[S]) -> Record {
    let mut record = Record::with_capacity(header.len());

    for (index, field) in header.fields().iter().enumerate() {
        let cell = row.get(index).map(|c| c.as_ref());
        let value = match (field.kind, cell) {
            (kind, None) => FieldValue::default_for(kind),
            (FieldKind::Array, Some(cell)) => FieldValue::Array(split_array_cell(cell)),
            (FieldKind::Scalar, Some(cell)) => FieldValue::Scalar(cell.to_string()),
        };
        record.push(field.name.as_str(), value);
    }

    record
}

/// 配列フィールドのセル値を要素に分割する
///
/// 分割後の各要素はそのまま保持します（連続する改行による空要素も残す）。
fn split_array_cell(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        Vec::new()
    } else {
        cell.split('\n').map(str::to_string).collect()
    }
}

/// グリッド全体を`Document`に変換する
///
/// # 戻り値
///
/// * `Ok(Document)` - 変換結果（ヘッダー行のみの場合は0件）
/// * `Err(XlsxToJsonError::EmptySheet)` - グリッドに行が存在しない場合
///
/// # 使用例
///
/// ```rust
/// use xlsx2json::convert_sheet;
///
/// let rows = vec![
///     vec!["Name", "TagsArray", "Level"],
///     vec!["Hero", "fire\nwater", "5"],
/// ];
/// let document = convert_sheet(&rows).unwrap();
/// assert_eq!(document.len(), 1);
/// ```
pub fn convert_sheet<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Document, XlsxToJsonError> {
    let header = build_header(rows)?;
    let records = rows[1..]
        .iter()
        .map(|row| build_record(&header, row))
        .collect();

    Ok(Document::new(header, records))
}
