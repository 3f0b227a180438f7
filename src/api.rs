//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// JSONの出力スタイル
///
/// どちらのスタイルでも、オブジェクトのキーはヘッダー行の順序で出力されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputStyle {
    /// 整形済みJSON（デフォルト）
    ///
    /// 各レコードは複数行にわたり、インデント幅は`with_indent()`で指定します
    /// （デフォルト: 4スペース）。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [
    ///     {
    ///         "Name": "Hero",
    ///         "TagsArray": [
    ///             "fire",
    ///             "water"
    ///         ],
    ///         "Level": "5"
    ///     }
    /// ]
    /// ```
    #[default]
    Pretty,

    /// 1行のJSON
    ///
    /// # 出力例
    ///
    /// ```json
    /// [{"Name":"Hero","TagsArray":["fire","water"],"Level":"5"}]
    /// ```
    Compact,
}
