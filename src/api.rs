//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 変換モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ConversionMode {
    /// 書式を反映する変換（デフォルト）
    ///
    /// 結合セル、太字/斜体、水平配置、数式コメントを出力に反映します。
    /// データを含む最初の行をヘッダーとし、データのない行は出力しません。
    ///
    /// # 出力例
    ///
    /// ```markdown
    /// | **Name** | **Score** |
    /// | :---: | :---: |
    /// | Alice | 90 |
    /// ```
    #[default]
    Advanced,

    /// 使用範囲をそのまま出力する変換
    ///
    /// 1行目を列見出しとし、列幅を揃えたパイプテーブルを出力します。
    /// 数値のみの列は右揃えになります。
    ///
    /// # 出力例
    ///
    /// ```markdown
    /// | Name  | Score |
    /// |:------|------:|
    /// | Alice |    90 |
    /// ```
    Basic,
}

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。出力は指定した順序になります。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートをワークブックの順序で変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),

    /// 複数のインデックス指定
    ///
    /// 例: `SheetSelector::Indices(vec![0, 2, 4])`
    Indices(Vec<usize>),

    /// 複数のシート名指定
    ///
    /// 例: `SheetSelector::Names(vec!["Sheet1".to_string(), "Sheet2".to_string()])`
    Names(Vec<String>),
}

impl SheetSelector {
    /// シート名のリストから選択方式を生成
    ///
    /// 空の場合は`All`、1件の場合は`Name`、それ以外は`Names`になります。
    pub fn from_names(names: Vec<String>) -> Self {
        match names.len() {
            0 => SheetSelector::All,
            1 => SheetSelector::Name(names.into_iter().next().unwrap_or_default()),
            _ => SheetSelector::Names(names),
        }
    }
}
