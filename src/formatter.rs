//! Formatter Module
//!
//! calamineのセル値を文字列に変換するモジュール。
//! 出力JSONの値は常に文字列であり、数値や論理値への型推論は行いません。

use calamine::{Data, ExcelDateTime};
use chrono::{NaiveDateTime, NaiveTime};

use crate::format::FormatParser;

/// `General`書式で表示する有効桁数
const GENERAL_PRECISION: usize = 15;

/// セルフォーマッター
///
/// セル値を、スプレッドシート上の表示に近い文字列へ変換します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter;

impl CellFormatter {
    pub fn new() -> Self {
        Self
    }

    /// セル値をフォーマット
    ///
    /// # 引数
    ///
    /// * `cell` - セル値
    /// * `number_format` - セルに設定された数値書式（`General`または不明の場合は`None`）
    ///
    /// # 変換規則
    ///
    /// - 文字列: そのまま
    /// - 数値: 数値書式があれば適用（`000` → `"007"`、`0%` → `"50%"`）。
    ///   書式がない場合は有効桁数15桁に丸めた最短表記（`5.0` → `"5"`）
    /// - 論理値: `TRUE` / `FALSE`
    /// - 日時: ISO 8601（時刻が0時0分0秒の場合は日付のみ）
    /// - エラー値: Excelのエラー表記（例: `#DIV/0!`）
    /// - 空セル: 空文字列
    pub fn format_cell(&self, cell: &Data, number_format: Option<&FormatParser>) -> String {
        match cell {
            Data::String(s) => s.clone(),
            Data::Int(i) => number_format
                .and_then(|f| f.format_number(*i as f64))
                .unwrap_or_else(|| i.to_string()),
            Data::Float(f) => number_format
                .and_then(|fmt| fmt.format_number(*f))
                .unwrap_or_else(|| format_general(*f)),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::DateTime(dt) => format_date_time(dt),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(e) => e.to_string(),
            Data::Empty => String::new(),
        }
    }
}

/// `General`書式の数値表記
///
/// 有効桁数15桁に丸めてから最短表記にします（`0.1 + 0.2` → `"0.3"`）。
fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    format!("{:.*e}", GENERAL_PRECISION - 1, value)
        .parse::<f64>()
        .unwrap_or(value)
        .to_string()
}

/// 日時セルをISO 8601形式に変換する
///
/// 期間（duration）や変換できない値は、シリアル値をそのまま出力します。
fn format_date_time(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        return format_general(value.as_f64());
    }

    match value.as_datetime() {
        Some(datetime) => format_naive(&datetime),
        None => format_general(value.as_f64()),
    }
}

fn format_naive(datetime: &NaiveDateTime) -> String {
    if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use chrono::NaiveDate;

    fn plain(cell: &Data) -> String {
        CellFormatter::new().format_cell(cell, None)
    }

    #[test]
    fn test_format_cell_string() {
        assert_eq!(plain(&Data::String("a\nb".to_string())), "a\nb");
        assert_eq!(plain(&Data::String("  keep  ".to_string())), "  keep  ");
    }

    #[test]
    fn test_format_cell_numbers() {
        assert_eq!(plain(&Data::Int(42)), "42");
        assert_eq!(plain(&Data::Float(5.0)), "5");
        assert_eq!(plain(&Data::Float(1.5)), "1.5");
        assert_eq!(plain(&Data::Float(-0.25)), "-0.25");
    }

    #[test]
    fn test_general_rounds_to_15_digits() {
        assert_eq!(plain(&Data::Float(0.1 + 0.2)), "0.3");
        assert_eq!(plain(&Data::Float(1.0 - 0.9)), "0.1");
        assert_eq!(plain(&Data::Float(123456789.123)), "123456789.123");
        assert_eq!(plain(&Data::Float(1234567890123456789.0)), "1234567890123460000");
    }

    #[test]
    fn test_number_format_is_applied() {
        let formatter = CellFormatter::new();
        let zero_padded = FormatParser::parse("000");
        let percent = FormatParser::parse("0%");

        assert_eq!(formatter.format_cell(&Data::Float(7.0), Some(&zero_padded)), "007");
        assert_eq!(formatter.format_cell(&Data::Int(7), Some(&zero_padded)), "007");
        assert_eq!(formatter.format_cell(&Data::Float(0.5), Some(&percent)), "50%");
    }

    #[test]
    fn test_unsupported_number_format_uses_general() {
        let formatter = CellFormatter::new();
        let scientific = FormatParser::parse("0.00E+00");
        assert_eq!(
            formatter.format_cell(&Data::Float(0.1 + 0.2), Some(&scientific)),
            "0.3"
        );
    }

    #[test]
    fn test_number_format_ignored_for_strings() {
        let formatter = CellFormatter::new();
        let zero_padded = FormatParser::parse("000");
        assert_eq!(
            formatter.format_cell(&Data::String("7".to_string()), Some(&zero_padded)),
            "7"
        );
    }

    #[test]
    fn test_format_cell_bool() {
        assert_eq!(plain(&Data::Bool(true)), "TRUE");
        assert_eq!(plain(&Data::Bool(false)), "FALSE");
    }

    #[test]
    fn test_format_cell_error() {
        assert_eq!(plain(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn test_format_cell_empty() {
        assert_eq!(plain(&Data::Empty), "");
    }

    #[test]
    fn test_format_cell_iso_strings() {
        assert_eq!(
            plain(&Data::DateTimeIso("2025-01-01T10:00:00".to_string())),
            "2025-01-01T10:00:00"
        );
        assert_eq!(plain(&Data::DurationIso("PT1H".to_string())), "PT1H");
    }

    #[test]
    fn test_format_naive_date_only() {
        let datetime = NaiveDate::from_ymd_opt(2025, 11, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_naive(&datetime), "2025-11-20");
    }

    #[test]
    fn test_format_naive_with_time() {
        let datetime = NaiveDate::from_ymd_opt(2025, 11, 20)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        assert_eq!(format_naive(&datetime), "2025-11-20T13:05:09");
    }
}
