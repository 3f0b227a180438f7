//! FormatSection Module
//!
//! Excel Number Format Stringのセクション定義を提供します。

use super::tokens::FormatToken;

/// セクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    /// 正数
    Positive,
    /// 負数
    Negative,
    /// ゼロ
    Zero,
    /// テキスト
    Text,
}

/// フォーマットのセクション（正数、負数、ゼロ、テキスト）
///
/// Excel Number Format Stringは`;`で最大4つのセクションに分割されます:
/// 1. 正数
/// 2. 負数
/// 3. ゼロ
/// 4. テキスト
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    /// セクションの種類
    pub kind: SectionKind,

    /// `General`セクションかどうか
    pub general: bool,

    /// フォーマットトークン
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    /// 新しいセクションを生成
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            general: false,
            tokens: Vec::new(),
        }
    }

    /// 数値書式として適用できるかどうか
    ///
    /// `General`、テキスト書式、未対応の要素を含むセクションは対象外です。
    pub fn is_supported(&self) -> bool {
        !self.general
            && !self
                .tokens
                .iter()
                .any(|t| matches!(t, FormatToken::Unsupported | FormatToken::TextPlaceholder))
    }

    /// 整数部の最小桁数（"0"の個数）
    pub fn integer_min_digits(&self) -> usize {
        self.integer_tokens()
            .map(|t| match t {
                FormatToken::IntegerZero(n) => *n,
                _ => 0,
            })
            .sum()
    }

    /// 小数部の（最小桁数, 最大桁数）
    pub fn decimal_digits(&self) -> (usize, usize) {
        self.tokens.iter().fold((0, 0), |(min, max), t| match t {
            FormatToken::DecimalZero(n) => (min + n, max + n),
            FormatToken::DecimalHash => (min, max + 1),
            _ => (min, max),
        })
    }

    /// パーセント記号の個数
    pub fn percent_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, FormatToken::Percent))
            .count()
    }

    /// 千の位区切りを使用するかどうか
    ///
    /// 区切り記号の後ろに整数部の桁が続く場合のみ区切りとみなします。
    pub fn uses_grouping(&self) -> bool {
        let integer_part = self.integer_part();
        integer_part.iter().enumerate().any(|(i, t)| {
            matches!(t, FormatToken::ThousandSeparator)
                && integer_part[i + 1..].iter().any(FormatToken::is_integer_digit)
        })
    }

    /// 末尾の区切り記号による1000分の1スケーリングの回数
    pub fn scale_count(&self) -> usize {
        let last_digit = self
            .tokens
            .iter()
            .rposition(|t| t.is_integer_digit() || t.is_decimal_digit());
        match last_digit {
            Some(pos) => self.tokens[pos + 1..]
                .iter()
                .take_while(|t| matches!(t, FormatToken::ThousandSeparator))
                .count(),
            None => 0,
        }
    }

    /// 整数部の桁プレースホルダーを含むかどうか
    pub fn has_integer_digits(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_integer_digit)
    }

    fn integer_tokens(&self) -> impl Iterator<Item = &FormatToken> {
        self.integer_part().iter().filter(|t| t.is_integer_digit())
    }

    /// 小数点より前のトークン
    fn integer_part(&self) -> &[FormatToken] {
        let end = self
            .tokens
            .iter()
            .position(|t| matches!(t, FormatToken::DecimalPoint))
            .unwrap_or(self.tokens.len());
        &self.tokens[..end]
    }
}
