//! FormatToken Module
//!
//! Excel Number Format Stringのトークン定義を提供します。

/// フォーマットトークン
///
/// Excel Number Format Stringを解析した際に生成されるトークンです。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// 整数部のゼロパディング（例: "0" -> 1桁, "000" -> 3桁）
    IntegerZero(usize),

    /// 整数部の任意桁（"#"）
    IntegerHash,

    /// 小数点
    DecimalPoint,

    /// 小数部の必須桁（例: "00" -> 2桁）
    DecimalZero(usize),

    /// 小数部の任意桁（"#"）
    DecimalHash,

    /// 千の位区切り、または末尾に置かれた場合は1000分の1へのスケーリング
    ThousandSeparator,

    /// パーセント記号
    Percent,

    /// リテラル文字列（例: "$", "-", " "）
    Literal(String),

    /// 色指定（例: "[Red]"）。出力には影響しない
    Color(String),

    /// テキストプレースホルダー（"@"）
    TextPlaceholder,

    /// 数値書式として扱わない要素（日付・時刻、指数、分数、条件など）
    Unsupported,
}

impl FormatToken {
    /// 整数部の桁プレースホルダーかどうか
    pub fn is_integer_digit(&self) -> bool {
        matches!(self, FormatToken::IntegerZero(_) | FormatToken::IntegerHash)
    }

    /// 小数部の桁プレースホルダーかどうか
    pub fn is_decimal_digit(&self) -> bool {
        matches!(self, FormatToken::DecimalZero(_) | FormatToken::DecimalHash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_integer_digit() {
        assert!(FormatToken::IntegerZero(3).is_integer_digit());
        assert!(FormatToken::IntegerHash.is_integer_digit());
        assert!(!FormatToken::DecimalZero(2).is_integer_digit());
        assert!(!FormatToken::Literal("0".to_string()).is_integer_digit());
    }

    #[test]
    fn test_is_decimal_digit() {
        assert!(FormatToken::DecimalZero(2).is_decimal_digit());
        assert!(FormatToken::DecimalHash.is_decimal_digit());
        assert!(!FormatToken::DecimalPoint.is_decimal_digit());
        assert!(!FormatToken::Percent.is_decimal_digit());
    }
}
