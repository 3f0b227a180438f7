//! xlsx2json - Converts spreadsheet tables into field-order-preserving JSON
//!
//! スプレッドシートの最初のシートを、ゲーム・アプリケーション用の設定データとして
//! JSONレコードの配列に変換するクレートです。
//!
//! - 1行目はヘッダー行で、JSONオブジェクトのキーとその順序を定義します
//! - 列名に`"Array"`を含むフィールドは文字列の配列になり、セル内の改行で分割されます
//! - それ以外のフィールドは常に文字列です（数値や論理値への変換は行いません）
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsx2json::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("Weapon.xlsx")?;
//!     let output = File::create("Weapon.json")?;
//!     converter.convert(input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Grids
//!
//! ```rust
//! use xlsx2json::ConverterBuilder;
//!
//! let converter = ConverterBuilder::new().build().unwrap();
//! let rows = vec![
//!     vec!["Name", "TagsArray", "Level"],
//!     vec!["Hero", "fire\nwater", "5"],
//! ];
//! let json = converter.convert_rows(&rows).unwrap();
//! assert!(json.contains("\"TagsArray\": [\n"));
//! ```
//!
//! # Batch Conversion
//!
//! ```rust,no_run
//! use xlsx2json::{batch, BatchConfig, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let config = BatchConfig::new("./assets/config", "./assets/resources/config");
//!
//!     let report = batch::run(&converter, &config)?;
//!     println!("{} converted, {} skipped", report.converted.len(), report.skipped.len());
//!
//!     Ok(())
//! }
//! ```

mod api;
pub mod batch;
mod builder;
mod error;
mod format;
mod formatter;
mod output;
mod parser;
mod security;
mod sheet;
mod types;

// 公開API
pub use api::OutputStyle;
pub use batch::{BatchConfig, BatchReport, ConvertedFile, SkippedFile};
pub use builder::{Converter, ConverterBuilder};
pub use error::XlsxToJsonError;
pub use output::serialize_document;
pub use sheet::{build_header, build_record, classify_field, convert_sheet};
pub use types::{Document, Field, FieldKind, FieldValue, Header, Record, ARRAY_MARKER};
