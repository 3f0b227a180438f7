//! Workbook Parser
//!
//! calamineを使用して、ワークブックの最初のシートを文字列グリッドとして取り出す。
//! XLSXの場合は、セルの数値書式を`metadata`モジュールから補って表示文字列を決定する。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read};

use crate::error::XlsxToJsonError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;

use super::metadata::SheetStyles;

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// XLSX / XLS / XLSB / ODS のいずれも、calamineが判別した形式で開きます。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
    formatter: CellFormatter,
    /// 最初のシートの数値書式（XLSX以外は`None`）
    styles: Option<SheetStyles>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - スプレッドシートを読み込むためのリーダー
    /// * `security` - 入力サイズの制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(XlsxToJsonError::SecurityViolation)` - 入力がサイズ上限を超えた場合
    /// * `Err(XlsxToJsonError::Parse)` - スプレッドシートとして解析できない場合
    /// * `Err(XlsxToJsonError::Xml)` - XLSXの書式情報が不正な場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, XlsxToJsonError> {
        let buffer = security.read_input(reader)?;
        let styles = SheetStyles::from_xlsx(&buffer, security);
        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        // calamineの解析エラーを書式情報のエラーより優先する
        let styles = styles?;

        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
            styles,
        })
    }

    /// すべてのシート名を取得
    pub fn get_sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 最初のシートを文字列グリッドとして読み込む
    ///
    /// 行と列はセルA1を起点にした位置で返します。各行の末尾の空セルは
    /// 取り除かれるため、行の長さは揃いません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<Vec<String>>)` - 行のリスト（使用セルがないシートは空）
    /// * `Err(XlsxToJsonError::NoWorksheet)` - シートが存在しない場合
    /// * `Err(XlsxToJsonError::Parse)` - シートの解析に失敗した場合
    pub fn first_sheet_rows(&mut self) -> Result<Vec<Vec<String>>, XlsxToJsonError> {
        let range = self
            .workbook
            .worksheet_range_at(0)
            .ok_or(XlsxToJsonError::NoWorksheet)??;

        Ok(range_to_rows(&range, &self.formatter, self.styles.as_ref()))
    }
}

/// calamineの`Range`を、A1起点の文字列グリッドに変換する
///
/// calamineの範囲は最初の使用セルから始まるため、先頭の空行・空列を補います。
/// 数値書式はシート上の絶対座標で参照します。
fn range_to_rows(
    range: &Range<Data>,
    formatter: &CellFormatter,
    styles: Option<&SheetStyles>,
) -> Vec<Vec<String>> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut rows: Vec<Vec<String>> = (0..start_row).map(|_| Vec::new()).collect();

    for (r, row) in range.rows().enumerate() {
        let absolute_row = start_row + r as u32;
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().enumerate().map(|(c, cell)| {
            let number_format =
                styles.and_then(|s| s.format_at(absolute_row, start_col + c as u32));
            formatter.format_cell(cell, number_format)
        }));
        trim_trailing_empty(&mut cells);
        rows.push(cells);
    }

    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }

    rows
}

fn trim_trailing_empty(cells: &mut Vec<String>) {
    while cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
}
