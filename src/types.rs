//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//!
//! `Record`は順序付きの`(キー, 値)`リストとして保持し、`Serialize`を手書きで
//! 実装しています。JSONオブジェクトのキーは常にヘッダー行の順序で出力されます。

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// 配列型フィールドを示すフィールド名中の部分文字列
pub const ARRAY_MARKER: &str = "Array";

/// フィールドの型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 単一の文字列値
    Scalar,

    /// 文字列の配列（フィールド名に`"Array"`を含む）
    Array,
}

impl FieldKind {
    /// フィールド名からフィールドの型を判定する
    ///
    /// フィールド名が部分文字列`"Array"`を含む場合（大文字小文字を区別、
    /// 位置は問わない）に限り`FieldKind::Array`を返します。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsx2json::FieldKind;
    ///
    /// assert_eq!(FieldKind::classify("TagsArray"), FieldKind::Array);
    /// assert_eq!(FieldKind::classify("MyArrayField"), FieldKind::Array);
    /// assert_eq!(FieldKind::classify("tagsarray"), FieldKind::Scalar);
    /// ```
    pub fn classify(field_name: &str) -> Self {
        if field_name.contains(ARRAY_MARKER) {
            FieldKind::Array
        } else {
            FieldKind::Scalar
        }
    }

    pub fn is_array(self) -> bool {
        self == FieldKind::Array
    }
}

/// ヘッダーの1列分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = FieldKind::classify(&name);
        Self { name, kind }
    }
}

/// シートのヘッダー行
///
/// フィールドの順序と、各フィールドの型を定義します。
/// シートごとに1回だけ構築され、そのシートのすべてのレコードで共有されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<Field>,
}

impl Header {
    /// 列名のリストからヘッダーを生成
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(Field::new).collect(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// フィールド名を宣言順に返す
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// レコードの1フィールド分の値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// スカラーフィールドの値（常に文字列）
    Scalar(String),

    /// 配列フィールドの値
    Array(Vec<String>),
}

impl FieldValue {
    /// 指定された型の欠損値（空文字列または空配列）
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar => FieldValue::Scalar(String::new()),
            FieldKind::Array => FieldValue::Array(Vec::new()),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            FieldValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::Array(items) => Some(items),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Scalar(s) => serializer.serialize_str(s),
            FieldValue::Array(items) => serializer.collect_seq(items),
        }
    }
}

/// データ行1行分のレコード
///
/// ヘッダーの宣言順に並んだ`(フィールド名, 値)`のリストです。
/// マップ型は使用せず、挿入順がそのまま出力順になります。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.entries.push((name.into(), value));
    }

    /// フィールド名で値を検索
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 1シート分の変換結果
///
/// データ行の順序を保持したレコードのリストです。JSON配列として出力されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    header: Header,
    records: Vec<Record>,
}

impl Document {
    pub(crate) fn new(header: Header, records: Vec<Record>) -> Self {
        Self { header, records }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}
