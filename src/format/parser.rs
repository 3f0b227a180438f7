//! FormatParser Module
//!
//! Excel Number Format Stringの構文解析と適用を提供します。
//!
//! 対応する書式は、桁プレースホルダー（`0`, `#`）、小数点、千の位区切り、
//! パーセント、リテラル、色指定、セクション（正;負;ゼロ;テキスト）です。
//! 日付・時刻、指数、分数、条件付き書式を含むセクションは`None`を返し、
//! 呼び出し側で`General`として扱います。

use super::sections::{FormatSection, SectionKind};
use super::tokens::FormatToken;

/// 色指定として認識する名前
const COLOR_NAMES: [&str; 8] = [
    "black", "blue", "cyan", "green", "magenta", "red", "white", "yellow",
];

/// Number Format Stringパーサー
///
/// Excel Number Format Stringを解析し、数値をフォーマットします。
#[derive(Debug, Clone)]
pub(crate) struct FormatParser {
    /// パースされたセクション
    sections: Vec<FormatSection>,
}

impl FormatParser {
    /// フォーマット文字列をパース
    ///
    /// 解析できない要素は`FormatToken::Unsupported`として記録するため、
    /// パース自体は失敗しません。
    pub fn parse(format_string: &str) -> Self {
        let mut sections = Vec::new();
        for (idx, section_str) in Self::split_sections(format_string).iter().enumerate() {
            let kind = match idx {
                0 => SectionKind::Positive,
                1 => SectionKind::Negative,
                2 => SectionKind::Zero,
                3 => SectionKind::Text,
                _ => break,
            };
            sections.push(Self::parse_section(section_str, kind));
        }

        if sections.is_empty() {
            let mut general = FormatSection::new(SectionKind::Positive);
            general.general = true;
            sections.push(general);
        }

        Self { sections }
    }

    /// セクションに分割
    ///
    /// `;`で分割します。引用符・角括弧の内側とエスケープされた文字は区切りとみなしません。
    fn split_sections(format_string: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_brackets = false;
        let mut chars = format_string.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' if !in_quotes => {
                    current.push(ch);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '[' if !in_quotes => {
                    in_brackets = true;
                    current.push(ch);
                }
                ']' if !in_quotes => {
                    in_brackets = false;
                    current.push(ch);
                }
                ';' if !in_quotes && !in_brackets => {
                    sections.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() || !sections.is_empty() {
            sections.push(current);
        }

        sections
    }

    /// セクションをパース
    fn parse_section(section_str: &str, kind: SectionKind) -> FormatSection {
        let mut section = FormatSection::new(kind);
        if section_str.trim().eq_ignore_ascii_case("general") {
            section.general = true;
            return section;
        }

        let mut chars = section_str.chars().peekable();
        let mut after_decimal = false;

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    let literal: String = chars.by_ref().take_while(|&c| c != '"').collect();
                    Self::push_literal(&mut section, &literal);
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        Self::push_literal(&mut section, &next.to_string());
                    }
                }
                '_' => {
                    // 次の文字の幅の空白
                    chars.next();
                    Self::push_literal(&mut section, " ");
                }
                '*' => {
                    // 繰り返し文字は無視
                    chars.next();
                }
                '[' => {
                    let content: String = chars.by_ref().take_while(|&c| c != ']').collect();
                    match Self::parse_bracket(&content) {
                        FormatToken::Literal(s) => Self::push_literal(&mut section, &s),
                        token => section.tokens.push(token),
                    }
                }
                '@' => section.tokens.push(FormatToken::TextPlaceholder),
                '0' => {
                    let count = Self::count_consecutive(&mut chars, '0') + 1;
                    section.tokens.push(if after_decimal {
                        FormatToken::DecimalZero(count)
                    } else {
                        FormatToken::IntegerZero(count)
                    });
                }
                '#' => section.tokens.push(if after_decimal {
                    FormatToken::DecimalHash
                } else {
                    FormatToken::IntegerHash
                }),
                '.' if !after_decimal => {
                    after_decimal = true;
                    section.tokens.push(FormatToken::DecimalPoint);
                }
                ',' => section.tokens.push(FormatToken::ThousandSeparator),
                '%' => section.tokens.push(FormatToken::Percent),
                'E' | 'e' if chars.peek().is_some_and(|&c| c == '+' || c == '-') => {
                    section.tokens.push(FormatToken::Unsupported);
                }
                '?' | '/' => section.tokens.push(FormatToken::Unsupported),
                c if "yYmMdDhHsS".contains(c) => section.tokens.push(FormatToken::Unsupported),
                _ => Self::push_literal(&mut section, &ch.to_string()),
            }
        }

        section
    }

    /// 角括弧内の要素を解釈する
    ///
    /// - `[Red]`, `[Color10]`: 色指定
    /// - `[$¥-411]`: 通貨記号（`$`と`-`の間）をリテラルとして扱う
    /// - 条件（`[>100]`）や経過時間（`[h]`）などは未対応
    fn parse_bracket(content: &str) -> FormatToken {
        if let Some(currency) = content.strip_prefix('$') {
            let symbol = currency.split('-').next().unwrap_or_default();
            return FormatToken::Literal(symbol.to_string());
        }

        let lower = content.to_ascii_lowercase();
        let is_color = COLOR_NAMES.contains(&lower.as_str())
            || lower
                .strip_prefix("color")
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
        if is_color {
            FormatToken::Color(content.to_string())
        } else {
            FormatToken::Unsupported
        }
    }

    /// 直前がリテラルであれば連結する
    fn push_literal(section: &mut FormatSection, text: &str) {
        if text.is_empty() {
            return;
        }
        match section.tokens.last_mut() {
            Some(FormatToken::Literal(s)) => s.push_str(text),
            _ => section.tokens.push(FormatToken::Literal(text.to_string())),
        }
    }

    /// 連続する同じ文字をカウント
    fn count_consecutive<I>(chars: &mut std::iter::Peekable<I>, target: char) -> usize
    where
        I: Iterator<Item = char>,
    {
        let mut count = 0;
        while chars.peek().is_some_and(|&c| c == target) {
            chars.next();
            count += 1;
        }
        count
    }

    /// 数値をフォーマット
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - フォーマット済み文字列
    /// * `None` - 選択されたセクションが`General`、または未対応の書式の場合
    pub fn format_number(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return None;
        }

        let (section, signed) = self.select_section(value);
        if !section.is_supported() {
            return None;
        }

        Some(Self::format_numeric(value.abs(), section, signed && value < 0.0))
    }

    /// 値に応じたセクションを選択する
    ///
    /// 負数用のセクションがない場合は最初のセクションを使い、符号を付けます（第2要素が`true`）。
    fn select_section(&self, value: f64) -> (&FormatSection, bool) {
        let first = &self.sections[0];
        let numeric = |kind: SectionKind| self.sections.iter().find(|s| s.kind == kind);

        if value < 0.0 {
            match numeric(SectionKind::Negative) {
                Some(section) => (section, false),
                None => (first, true),
            }
        } else if value == 0.0 {
            (numeric(SectionKind::Zero).unwrap_or(first), false)
        } else {
            (first, false)
        }
    }

    /// 数値部分をフォーマット
    fn format_numeric(abs_value: f64, section: &FormatSection, negative: bool) -> String {
        let value = abs_value * 100f64.powi(section.percent_count() as i32)
            / 1000f64.powi(section.scale_count() as i32);

        // 小数部の桁数で四捨五入（0.5は切り上げ）
        let (min_decimals, max_decimals) = section.decimal_digits();
        let factor = 10f64.powi(max_decimals as i32);
        let rounded = (value * factor).round() / factor;

        let fixed = format!("{:.*}", max_decimals, rounded);
        let (int_raw, frac_raw) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
            None => (fixed, String::new()),
        };

        let mut frac = frac_raw;
        while frac.len() > min_decimals && frac.ends_with('0') {
            frac.pop();
        }

        let min_integer = section.integer_min_digits();
        let mut int_digits = if int_raw == "0" && min_integer == 0 {
            String::new()
        } else {
            int_raw
        };
        while int_digits.len() < min_integer {
            int_digits.insert(0, '0');
        }
        if section.uses_grouping() {
            int_digits = Self::add_thousand_separators(&int_digits);
        }

        let has_integer_digits = section.has_integer_digits();
        let mut result = String::new();
        let mut int_written = false;
        let mut frac_written = false;

        for token in &section.tokens {
            match token {
                FormatToken::IntegerZero(_) | FormatToken::IntegerHash => {
                    if !int_written {
                        result.push_str(&int_digits);
                        int_written = true;
                    }
                }
                FormatToken::DecimalPoint => {
                    if !has_integer_digits && !int_written {
                        result.push_str(&int_digits);
                        int_written = true;
                    }
                    result.push('.');
                }
                FormatToken::DecimalZero(_) | FormatToken::DecimalHash => {
                    if !frac_written {
                        result.push_str(&frac);
                        frac_written = true;
                    }
                }
                FormatToken::Percent => result.push('%'),
                FormatToken::Literal(s) => result.push_str(s),
                FormatToken::ThousandSeparator
                | FormatToken::Color(_)
                | FormatToken::TextPlaceholder
                | FormatToken::Unsupported => {}
            }
        }

        if negative && rounded != 0.0 {
            result.insert(0, '-');
        }

        result
    }

    /// 千の位区切りを追加
    fn add_thousand_separators(s: &str) -> String {
        let mut result = String::with_capacity(s.len() + s.len() / 3);
        let len = s.len();

        for (i, ch) in s.chars().enumerate() {
            result.push(ch);
            let remaining = len - i - 1;
            if remaining > 0 && remaining % 3 == 0 {
                result.push(',');
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(code: &str, value: f64) -> Option<String> {
        FormatParser::parse(code).format_number(value)
    }

    #[test]
    fn test_split_sections() {
        let sections = FormatParser::split_sections("0;0;0;@");
        assert_eq!(sections, vec!["0", "0", "0", "@"]);

        assert_eq!(FormatParser::split_sections("0.00"), vec!["0.00"]);
        assert_eq!(
            FormatParser::split_sections("\"a;b\"0;[Red]0"),
            vec!["\"a;b\"0", "[Red]0"]
        );
    }

    #[test]
    fn test_parse_simple_number() {
        let parser = FormatParser::parse("000");
        assert_eq!(parser.sections.len(), 1);
        assert_eq!(parser.sections[0].tokens, vec![FormatToken::IntegerZero(3)]);
    }

    #[test]
    fn test_parse_decimal() {
        let parser = FormatParser::parse("0.0#");
        assert_eq!(
            parser.sections[0].tokens,
            vec![
                FormatToken::IntegerZero(1),
                FormatToken::DecimalPoint,
                FormatToken::DecimalZero(1),
                FormatToken::DecimalHash,
            ]
        );
    }

    #[test]
    fn test_format_zero_padding() {
        assert_eq!(format("000", 7.0).as_deref(), Some("007"));
        assert_eq!(format("000", 1234.0).as_deref(), Some("1234"));
        assert_eq!(format("0", 0.0).as_deref(), Some("0"));
        assert_eq!(format("0", 2.5).as_deref(), Some("3"));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format("0.00", 1.5).as_deref(), Some("1.50"));
        assert_eq!(format("0.00", 123.456).as_deref(), Some("123.46"));
        assert_eq!(format("0.00", 999.999).as_deref(), Some("1000.00"));
        assert_eq!(format("0.00", 0.125).as_deref(), Some("0.13"));
        assert_eq!(format("0.0#", 1.5).as_deref(), Some("1.5"));
        assert_eq!(format("0.0#", 1.257).as_deref(), Some("1.26"));
        assert_eq!(format("#.##", 0.5).as_deref(), Some(".5"));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format("0%", 0.5).as_deref(), Some("50%"));
        assert_eq!(format("0.00%", 0.1234).as_deref(), Some("12.34%"));
        assert_eq!(format("0%", -0.25).as_deref(), Some("-25%"));
    }

    #[test]
    fn test_format_thousand_separator() {
        assert_eq!(format("#,##0", 1234567.0).as_deref(), Some("1,234,567"));
        assert_eq!(format("#,##0", 5.0).as_deref(), Some("5"));
        assert_eq!(format("#,##0.00", 1234.5).as_deref(), Some("1,234.50"));
        assert_eq!(format("#,##0", -1234.0).as_deref(), Some("-1,234"));
    }

    #[test]
    fn test_format_scaling() {
        assert_eq!(format("0,", 12345.0).as_deref(), Some("12"));
        assert_eq!(format("0.0,,\"M\"", 2_500_000.0).as_deref(), Some("2.5M"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format("\"$\"#,##0.00", 1234.56).as_deref(), Some("$1,234.56"));
        assert_eq!(format("[$¥-411]#,##0", 1500.0).as_deref(), Some("¥1,500"));
        assert_eq!(format("$#,##0_);($#,##0)", 1234.0).as_deref(), Some("$1,234 "));
        assert_eq!(format("$#,##0_);($#,##0)", -1234.0).as_deref(), Some("($1,234)"));
    }

    #[test]
    fn test_format_sections() {
        assert_eq!(format("0;(0)", -5.0).as_deref(), Some("(5)"));
        assert_eq!(format("0;-0;\"zero\"", 0.0).as_deref(), Some("zero"));
        assert_eq!(format("0;-0;\"zero\"", 3.0).as_deref(), Some("3"));
        assert_eq!(format("[Red]0;[Blue]0", -3.0).as_deref(), Some("3"));
    }

    #[test]
    fn test_format_escaped_literals() {
        assert_eq!(format("0\\ \"pt\"", 10.0).as_deref(), Some("10 pt"));
        assert_eq!(format("\"Lv.\"00", 3.0).as_deref(), Some("Lv.03"));
    }

    #[test]
    fn test_general_and_text_fall_back() {
        assert_eq!(format("General", 1.5), None);
        assert_eq!(format("", 1.5), None);
        assert_eq!(format("@", 1.5), None);
    }

    #[test]
    fn test_unsupported_formats_fall_back() {
        assert_eq!(format("yyyy-mm-dd", 45658.0), None);
        assert_eq!(format("h:mm:ss", 0.5), None);
        assert_eq!(format("0.00E+00", 12345.0), None);
        assert_eq!(format("# ?/?", 0.5), None);
        assert_eq!(format("[>100]0;0", 5.0), None);
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(format("0.00", f64::NAN), None);
        assert_eq!(format("0.00", f64::INFINITY), None);
    }
}
