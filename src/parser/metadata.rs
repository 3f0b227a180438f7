//! XML Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得できないセルの数値書式を抽出するモジュール。
//!
//! 1. `xl/workbook.xml`と`xl/_rels/workbook.xml.rels`から最初のシートのXMLパスを解決する
//! 2. `xl/styles.xml`の`<numFmts>`と`<cellXfs>`から、スタイルIDごとの書式を構築する
//! 3. ワークシートXMLの`<c r="A2" s="1">`から、セルごとのスタイルIDを取得する

use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::XlsxToJsonError;
use crate::format::FormatParser;
use crate::security::{validate_zip_path, SecurityConfig};

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PATH: &str = "xl/styles.xml";
const DEFAULT_SHEET_PATH: &str = "xl/worksheets/sheet1.xml";

/// 最初のシートのセル書式
///
/// 数値書式が`General`以外のセルのみを保持します。
#[derive(Debug, Default)]
pub(crate) struct SheetStyles {
    /// (行, 列) -> スタイルID
    cell_styles: HashMap<(u32, u32), u32>,
    /// スタイルID -> 数値書式
    formats: HashMap<u32, FormatParser>,
}

impl SheetStyles {
    /// XLSXファイルのバイト列から最初のシートの書式を読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(SheetStyles))` - XLSXとして書式を読み込めた場合
    /// * `Ok(None)` - XLSX以外の形式（XLS、XLSB、ODSなど）の場合
    /// * `Err(XlsxToJsonError::Xml)` - 書式情報のXMLが不正な場合
    /// * `Err(XlsxToJsonError::SecurityViolation)` - 不正なパス、またはサイズ上限を超えた場合
    pub fn from_xlsx(
        data: &[u8],
        security: &SecurityConfig,
    ) -> Result<Option<Self>, XlsxToJsonError> {
        let mut archive = match ZipArchive::new(Cursor::new(data)) {
            Ok(archive) => archive,
            Err(_) => return Ok(None),
        };

        let workbook = match read_part(&mut archive, WORKBOOK_PATH, security)? {
            Some(xml) => xml,
            None => return Ok(None),
        };

        let formats = match read_part(&mut archive, STYLES_PATH, security)? {
            Some(xml) => parse_styles(&xml)?,
            None => HashMap::new(),
        };
        if formats.is_empty() {
            return Ok(Some(Self::default()));
        }

        let sheet_path = first_sheet_path(&mut archive, &workbook, security)?;
        let cell_styles = match read_part(&mut archive, &sheet_path, security)? {
            Some(xml) => parse_cell_styles(&xml, &formats)?,
            None => HashMap::new(),
        };

        debug!(
            sheet = %sheet_path,
            styles = formats.len(),
            cells = cell_styles.len(),
            "Loaded number formats"
        );

        Ok(Some(Self {
            cell_styles,
            formats,
        }))
    }

    /// セルの数値書式を取得
    ///
    /// # 引数
    ///
    /// * `row` - 行インデックス（0始まり）
    /// * `col` - 列インデックス（0始まり）
    pub fn format_at(&self, row: u32, col: u32) -> Option<&FormatParser> {
        self.cell_styles
            .get(&(row, col))
            .and_then(|style_id| self.formats.get(style_id))
    }
}

fn xml_error(e: impl Display) -> XlsxToJsonError {
    XlsxToJsonError::Xml(e.to_string())
}

/// アーカイブ内のファイルを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    security: &SecurityConfig,
) -> Result<Option<Vec<u8>>, XlsxToJsonError> {
    match archive.by_name(name) {
        Ok(file) => Ok(Some(security.read_input(file)?)),
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(XlsxToJsonError::Zip(e.to_string())),
    }
}

/// 要素の属性値を取得（名前空間接頭辞は無視）
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, XlsxToJsonError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 最初のシートのXMLパスを解決する
///
/// `workbook.xml`の最初の`<sheet r:id>`をリレーションシップで解決します。
/// 解決できない場合は`xl/worksheets/sheet1.xml`を使用します。
fn first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    workbook: &[u8],
    security: &SecurityConfig,
) -> Result<String, XlsxToJsonError> {
    let relationship_id = match first_sheet_relationship(workbook)? {
        Some(id) => id,
        None => return Ok(DEFAULT_SHEET_PATH.to_string()),
    };

    let target = match read_part(archive, WORKBOOK_RELS_PATH, security)? {
        Some(rels) => parse_relationships(&rels)?.remove(&relationship_id),
        None => None,
    };

    match target {
        Some(target) => {
            let path = resolve_target(&target);
            validate_zip_path(&path).map_err(|e| {
                XlsxToJsonError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;
            Ok(path)
        }
        None => Ok(DEFAULT_SHEET_PATH.to_string()),
    }
}

/// リレーションシップのターゲットをアーカイブ内のパスに変換する
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// `xl/workbook.xml`から最初のシートのリレーションシップIDを取得
fn first_sheet_relationship(xml: &[u8]) -> Result<Option<String>, XlsxToJsonError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                return attribute(&e, b"id");
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }
}

/// `xl/_rels/workbook.xml.rels`を解析（Id -> Target）
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, XlsxToJsonError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attribute(&e, b"Id")?;
                let target = attribute(&e, b"Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// `xl/styles.xml`を解析
///
/// `<numFmts>`のカスタム書式と`<cellXfs>`のスタイル一覧から、
/// スタイルID -> 数値書式のマッピングを構築します。`General`のスタイルは含めません。
fn parse_styles(xml: &[u8]) -> Result<HashMap<u32, FormatParser>, XlsxToJsonError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"numFmt" => {
                    // <numFmt numFmtId="164" formatCode="000"/>
                    let id = attribute(&e, b"numFmtId")?.and_then(|s| s.parse::<u32>().ok());
                    let code = attribute(&e, b"formatCode")?;
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_formats.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    // <xf numFmtId="164" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/>
                    let id = attribute(&e, b"numFmtId")?
                        .and_then(|s| s.parse::<u32>().ok())
                        .unwrap_or(0);
                    xf_format_ids.push(id);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    let mut formats = HashMap::new();
    for (style_id, num_fmt_id) in xf_format_ids.into_iter().enumerate() {
        let code = custom_formats
            .get(&num_fmt_id)
            .map(String::as_str)
            .or_else(|| get_builtin_format(num_fmt_id));
        match code {
            Some(code) if !code.eq_ignore_ascii_case("general") => {
                formats.insert(style_id as u32, FormatParser::parse(code));
            }
            _ => {}
        }
    }

    Ok(formats)
}

/// ワークシートXMLからセルのスタイルIDを取得
///
/// `formats`に含まれるスタイル（`General`以外）のセルのみを記録します。
fn parse_cell_styles(
    xml: &[u8],
    formats: &HashMap<u32, FormatParser>,
) -> Result<HashMap<(u32, u32), u32>, XlsxToJsonError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut cell_styles = HashMap::new();
    let mut current_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut seen_row = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    // r属性がない行は直前の行の次とみなす
                    let r = attribute(&e, b"r")?.and_then(|s| s.parse::<u32>().ok());
                    current_row = match r {
                        Some(r) => r.saturating_sub(1),
                        None if seen_row => current_row.saturating_add(1),
                        None => 0,
                    };
                    seen_row = true;
                    next_col = 0;
                }
                b"c" => {
                    let position = attribute(&e, b"r")?
                        .and_then(|r| parse_cell_ref(&r))
                        .unwrap_or((current_row, next_col));
                    next_col = position.1.saturating_add(1);

                    let style = attribute(&e, b"s")?.and_then(|s| s.parse::<u32>().ok());
                    if let Some(style) = style.filter(|s| formats.contains_key(s)) {
                        cell_styles.insert(position, style);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(cell_styles)
}

/// セル参照文字列を座標に変換（例: "A1" -> (0, 0)、"AB12" -> (11, 27)）
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let col = letters.chars().try_fold(0u32, |acc, ch| {
        let value = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        acc.checked_mul(26)?.checked_add(value)
    })?;
    let row = digits.parse::<u32>().ok()?;

    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

/// ビルトイン書式ID（0-163）のマッピング
///
/// Excelの標準書式IDとフォーマット文字列の対応表です。
fn get_builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0_);(#,##0)"),
        38 => Some("#,##0_);[Red](#,##0)"),
        39 => Some("#,##0.00_);(#,##0.00)"),
        40 => Some("#,##0.00_);[Red](#,##0.00)"),
        41 => Some("_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
        42 => Some("_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
        44 => Some("_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mm:ss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="000"/>
    <numFmt numFmtId="165" formatCode="&quot;Lv.&quot;0"/>
  </numFmts>
  <cellStyleXfs count="1"><xf numFmtId="3"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="9" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="165" fontId="0" applyNumberFormat="1"></xf>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_get_builtin_format() {
        assert_eq!(get_builtin_format(0), Some("General"));
        assert_eq!(get_builtin_format(1), Some("0"));
        assert_eq!(get_builtin_format(9), Some("0%"));
        assert_eq!(get_builtin_format(49), Some("@"));
        assert_eq!(get_builtin_format(50), None);
        assert_eq!(get_builtin_format(164), None);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("C5"), Some((4, 2)));
        assert_eq!(parse_cell_ref("AB12"), Some((11, 27)));
        assert_eq!(parse_cell_ref("a1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A1B"), None);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_parse_styles() {
        let formats = parse_styles(STYLES_XML.as_bytes()).unwrap();

        // スタイル0（General）は含まれない
        assert!(!formats.contains_key(&0));
        assert_eq!(formats[&1].format_number(7.0).as_deref(), Some("007"));
        assert_eq!(formats[&2].format_number(0.5).as_deref(), Some("50%"));
        assert_eq!(formats[&3].format_number(3.0).as_deref(), Some("Lv.3"));
        assert_eq!(formats.len(), 3);
    }

    #[test]
    fn test_parse_cell_styles() {
        let formats = parse_styles(STYLES_XML.as_bytes()).unwrap();
        let sheet = r#"<worksheet><sheetData>
  <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" s="0" t="s"><v>1</v></c></row>
  <row r="2"><c r="A2" s="1"><v>7</v></c><c s="2"><v>0.5</v></c></row>
  <row><c s="3"><v>3</v></c></row>
</sheetData></worksheet>"#;

        let cell_styles = parse_cell_styles(sheet.as_bytes(), &formats).unwrap();
        assert_eq!(cell_styles.get(&(1, 0)), Some(&1));
        assert_eq!(cell_styles.get(&(1, 1)), Some(&2));
        assert_eq!(cell_styles.get(&(2, 0)), Some(&3));
        assert_eq!(cell_styles.get(&(0, 1)), None);
        assert_eq!(cell_styles.len(), 3);
    }

    #[test]
    fn test_parse_relationships() {
        let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Data" sheetId="1" r:id="rId3"/><sheet name="Other" sheetId="2" r:id="rId1"/></sheets>
</workbook>"#;
        let rels = r#"<Relationships>
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet2.xml"/>
  <Relationship Id="rId3" Type="worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

        let id = first_sheet_relationship(workbook.as_bytes()).unwrap();
        assert_eq!(id.as_deref(), Some("rId3"));

        let relationships = parse_relationships(rels.as_bytes()).unwrap();
        assert_eq!(relationships["rId3"], "worksheets/sheet1.xml");
    }

    #[test]
    fn test_malformed_styles_is_xml_error() {
        let result = parse_styles(b"<styleSheet><cellXfs></numFmts></styleSheet>");
        assert!(matches!(result, Err(XlsxToJsonError::Xml(_))));
    }

    #[test]
    fn test_from_xlsx_reads_first_sheet_formats() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Code").unwrap();
        sheet
            .write_number_with_format(1, 0, 7.0, &Format::new().set_num_format("000"))
            .unwrap();
        sheet.write_number(1, 1, 1.5).unwrap();
        let data = workbook.save_to_buffer().unwrap();

        let styles = SheetStyles::from_xlsx(&data, &SecurityConfig::default())
            .unwrap()
            .unwrap();
        let format = styles.format_at(1, 0).unwrap();
        assert_eq!(format.format_number(7.0).as_deref(), Some("007"));
        assert!(styles.format_at(0, 0).is_none());
        assert!(styles.format_at(1, 1).is_none());
    }

    #[test]
    fn test_from_xlsx_ignores_other_formats() {
        let styles =
            SheetStyles::from_xlsx(b"not a zip archive", &SecurityConfig::default()).unwrap();
        assert!(styles.is_none());
    }
}
