//! Format Module
//!
//! Excel Number Format Stringの構文解析と適用を提供します。
//! 数値セルを、スプレッドシート上の表示と同じ文字列に変換するために使用します。

mod parser;
mod sections;
mod tokens;

pub(crate) use parser::FormatParser;
