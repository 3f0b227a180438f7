//! Parser Module
//!
//! calamineを使用したスプレッドシート解析の実装。
//! 最初のシートのみを文字列グリッドとして読み込みます。

mod metadata;
mod workbook;

pub(crate) use workbook::WorkbookParser;
