//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::api::{ConversionMode, SheetSelector};
use crate::error::SheetToMdError;
use crate::output::OutputFormatter;
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::sheet::Sheet;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 変換モード
    pub mode: ConversionMode,

    /// 数式をコメントとして出力するか（Advancedのみ）
    pub include_formulas: bool,

    /// 行番号列を出力するか（Basicのみ）
    pub include_index: bool,
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetdown::{ConversionMode, ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), sheetdown::SheetToMdError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_mode(ConversionMode::Advanced)
///     .include_formulas(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 変換モード: Advanced
    /// - 数式コメント: 出力しない
    /// - 行番号列: 出力しない
    pub fn new() -> Self {
        Self::default()
    }

    /// 変換対象のシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetdown::{ConverterBuilder, SheetSelector};
    ///
    /// // 単一シートを名前で指定
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Sheet1".to_string()));
    ///
    /// // 複数シートを指定（出力はこの順序）
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Indices(vec![2, 0]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 変換モードを指定する
    pub fn with_mode(mut self, mode: ConversionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// 数式セルに`<!-- Formula: ... -->`コメントを付けるかを指定する
    ///
    /// Advancedモードのデータ行にのみ適用されます。
    pub fn include_formulas(mut self, include: bool) -> Self {
        self.config.include_formulas = include;
        self
    }

    /// 先頭に0始まりの行番号列を付けるかを指定する
    ///
    /// Basicモードでのみ有効です。Advancedモードでは無視されます。
    pub fn include_index(mut self, include: bool) -> Self {
        self.config.include_index = include;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetToMdError::Config(String)`: 複数指定のシート選択が空の場合
    pub fn build(self) -> Result<Converter, SheetToMdError> {
        match &self.config.sheet_selector {
            SheetSelector::Indices(indices) if indices.is_empty() => {
                return Err(SheetToMdError::Config(
                    "Sheet selector contains no indices".to_string(),
                ));
            }
            SheetSelector::Names(names) if names.is_empty() => {
                return Err(SheetToMdError::Config(
                    "Sheet selector contains no names".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートをMarkdown形式に変換するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetdown::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), sheetdown::SheetToMdError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("example.xlsx")?;
/// let mut output = Vec::new();
/// converter.convert(input, &mut output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// 入力制限
    security: SecurityConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            security: SecurityConfig::default(),
        }
    }

    /// スプレッドシートをMarkdown形式に変換
    ///
    /// # 処理フロー
    ///
    /// 1. 入力をメモリに読み込む（サイズ上限を検証）
    /// 2. シート選択
    /// 3. 選択したシートを順に読み込む
    /// 4. 各シートを並列にレンダリングし、選択順に並べ直す
    /// 5. 複数シートの場合は`## シート名`の見出しを付けて出力
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheetdown::ConverterBuilder;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), sheetdown::SheetToMdError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let input = File::open("example.xlsx")?;
    /// converter.convert(input, std::io::stdout())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<(), SheetToMdError> {
        let sheets = self.load_sheets(input)?;

        let formatter = OutputFormatter::from_config(&self.config);
        let mut rendered: Vec<(usize, String)> = sheets
            .par_iter()
            .enumerate()
            .map(|(index, sheet)| (index, formatter.render(sheet)))
            .collect();

        // 結果をインデックス順にソート（並列処理の順序を保証）
        rendered.sort_by_key(|(index, _)| *index);

        let with_headings = sheets.len() > 1;
        let mut writer = BufWriter::new(output);
        for (sheet, (_, markdown)) in sheets.iter().zip(&rendered) {
            if with_headings {
                write!(writer, "## {}\n\n", sheet.name())?;
            }
            writer.write_all(markdown.as_bytes())?;
            writer.write_all(b"\n\n")?;
        }
        writer.flush()?;

        Ok(())
    }

    /// スプレッドシートをMarkdown形式の文字列に変換
    pub fn convert_to_string<R: Read + Seek>(&self, input: R) -> Result<String, SheetToMdError> {
        let mut buffer = Vec::new();
        self.convert(input, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// ファイルを読み込み、Markdownファイルに書き出す
    ///
    /// 出力先の親ディレクトリは事前に存在している必要があります。
    pub fn convert_file(
        &self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<(), SheetToMdError> {
        let input = File::open(input_path.as_ref())?;
        // 変換に成功した場合のみ出力ファイルを作成する
        let markdown = self.convert_to_string(input)?;
        std::fs::write(output_path.as_ref(), markdown)?;
        Ok(())
    }

    /// ワークブックのシート名を順序どおりに取得
    pub fn sheet_names<R: Read + Seek>(&self, input: R) -> Result<Vec<String>, SheetToMdError> {
        let data = self.security.read_input(input)?;
        let parser = WorkbookParser::open(data, &self.security)?;
        Ok(parser.sheet_names())
    }

    /// 選択されたシートを選択順に読み込む
    fn load_sheets<R: Read>(&self, input: R) -> Result<Vec<Sheet>, SheetToMdError> {
        let data = self.security.read_input(input)?;
        let mut parser = WorkbookParser::open(data, &self.security)?;

        let sheet_names = parser.select_sheets(&self.config.sheet_selector)?;
        tracing::debug!(sheets = ?sheet_names, mode = ?self.config.mode, "selected sheets");

        sheet_names
            .iter()
            .map(|name| parser.load_sheet(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_converter_builder_new() {
        let builder = ConverterBuilder::new();
        assert_eq!(builder.config.sheet_selector, SheetSelector::All);
        assert_eq!(builder.config.mode, ConversionMode::Advanced);
        assert!(!builder.config.include_formulas);
        assert!(!builder.config.include_index);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Name("Data".to_string()))
            .with_mode(ConversionMode::Basic)
            .include_formulas(true)
            .include_index(true);

        assert!(matches!(
            builder.config.sheet_selector,
            SheetSelector::Name(ref name) if name == "Data"
        ));
        assert_eq!(builder.config.mode, ConversionMode::Basic);
        assert!(builder.config.include_formulas);
        assert!(builder.config.include_index);
    }

    #[test]
    fn test_build_success() {
        assert!(ConverterBuilder::new().build().is_ok());
        assert!(ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Indices(vec![0, 1]))
            .build()
            .is_ok());
    }

    #[test]
    fn test_build_with_empty_indices() {
        let result = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Indices(vec![]))
            .build();
        match result {
            Err(SheetToMdError::Config(msg)) => assert!(msg.contains("no indices")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_empty_names() {
        let result = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Names(vec![]))
            .build();
        assert!(matches!(result, Err(SheetToMdError::Config(_))));
    }

    #[test]
    fn test_converter_convert_to_string_with_invalid_input() {
        let converter = ConverterBuilder::new().build().unwrap();
        let result = converter.convert_to_string(Cursor::new(Vec::<u8>::new()));
        assert!(result.is_err());
    }
}
