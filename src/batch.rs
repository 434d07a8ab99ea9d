//! Batch Conversion Module
//!
//! 入力ディレクトリ内のスプレッドシートをまとめてMarkdownに変換するモジュール。
//! 1ファイルごとに`<出力ディレクトリ>/<ファイル名>.md`を書き出します。

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::api::ConversionMode;
use crate::builder::{Converter, ConverterBuilder};
use crate::error::SheetToMdError;

/// 変換対象とする拡張子（大文字小文字を区別しない）
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 変換に成功したファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// 変換に失敗したファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// 一括変換の結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub converted: Vec<BatchEntry>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// 成功件数
    pub fn success_count(&self) -> usize {
        self.converted.len()
    }

    /// 失敗件数
    pub fn error_count(&self) -> usize {
        self.failed.len()
    }

    /// 対象ファイルが1つもなかったか
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty() && self.failed.is_empty()
    }
}

/// ディレクトリ単位の一括変換
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetdown::BatchConverter;
///
/// # fn main() -> Result<(), sheetdown::SheetToMdError> {
/// let report = BatchConverter::new("input", "output")?.run()?;
/// println!("{} converted, {} failed", report.success_count(), report.error_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BatchConverter {
    input_dir: PathBuf,
    output_dir: PathBuf,
    converter: Converter,
}

impl BatchConverter {
    /// デフォルト設定（Advancedモード、数式コメントあり）で生成
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, SheetToMdError> {
        let converter = ConverterBuilder::new()
            .with_mode(ConversionMode::Advanced)
            .include_formulas(true)
            .build()?;
        Ok(Self::with_converter(input_dir, output_dir, converter))
    }

    /// 任意の`Converter`を使って生成
    pub fn with_converter(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        converter: Converter,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            converter,
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 入力ディレクトリ内の変換対象ファイルを名前順に列挙
    ///
    /// サブディレクトリは探索しません。
    pub fn scan(&self) -> Result<Vec<PathBuf>, SheetToMdError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            if path.is_file() && is_spreadsheet(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// 一括変換を実行
    ///
    /// 入出力ディレクトリが存在しない場合は作成します。
    /// 個々のファイルの失敗は`BatchReport::failed`に記録され、処理は続行されます。
    pub fn run(&self) -> Result<BatchReport, SheetToMdError> {
        for dir in [&self.input_dir, &self.output_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                tracing::info!(dir = %dir.display(), "created directory");
            }
        }

        let files = self.scan()?;
        if files.is_empty() {
            tracing::info!(dir = %self.input_dir.display(), "no spreadsheet files found");
        }

        let mut report = BatchReport::default();
        for (i, input) in files.into_iter().enumerate() {
            let output = self.output_path(&input);
            tracing::info!(
                n = i + 1,
                input = %input.display(),
                output = %output.display(),
                "converting"
            );

            match self.converter.convert_file(&input, &output) {
                Ok(()) => report.converted.push(BatchEntry { input, output }),
                Err(e) => {
                    tracing::warn!(input = %input.display(), error = %e, "conversion failed");
                    report.failed.push(BatchFailure {
                        input,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            success = report.success_count(),
            failed = report.error_count(),
            "batch finished"
        );
        Ok(report)
    }

    /// 出力ファイルのパス（拡張子を`.md`に置き換え）
    fn output_path(&self, input: &Path) -> PathBuf {
        let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
        name.push(".md");
        self.output_dir.join(name)
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("a.xlsx")));
        assert!(is_spreadsheet(Path::new("B.XLS")));
        assert!(is_spreadsheet(Path::new("c.Ods")));
        assert!(!is_spreadsheet(Path::new("notes.md")));
        assert!(!is_spreadsheet(Path::new("xlsx")));
    }

    #[test]
    fn test_output_path() {
        let batch = BatchConverter::new("in", "out").unwrap();
        assert_eq!(
            batch.output_path(Path::new("in/report.v2.xlsx")),
            PathBuf::from("out/report.v2.md")
        );
    }

    #[test]
    fn test_run_creates_directories() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input");
        let output = temp.path().join("output");

        let report = BatchConverter::new(&input, &output).unwrap().run().unwrap();
        assert!(report.is_empty());
        assert!(input.is_dir());
        assert!(output.is_dir());
    }

    #[test]
    fn test_run_records_failures() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("broken.xlsx"), b"not a zip").unwrap();
        std::fs::write(input.join("readme.txt"), b"ignored").unwrap();

        let batch = BatchConverter::new(&input, temp.path().join("output")).unwrap();
        let report = batch.run().unwrap();

        assert_eq!(report.success_count(), 0);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.failed[0].input, input.join("broken.xlsx"));
        assert!(!batch.output_dir().join("broken.md").exists());
    }

    #[test]
    fn test_run_converts_workbooks() {
        use rust_xlsxwriter::{Format, Formula, Workbook};

        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input");
        let output = temp.path().join("output");
        std::fs::create_dir_all(&input).unwrap();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .write_string_with_format(0, 0, "Item", &Format::new().set_bold())
            .unwrap();
        worksheet.write_string(0, 1, "Total").unwrap();
        worksheet.write_string(1, 0, "pen").unwrap();
        worksheet.write_number(1, 1, 3.0).unwrap();
        worksheet.write_string(2, 0, "sum").unwrap();
        worksheet
            .write_formula(2, 1, Formula::new("=B2*2").set_result("6"))
            .unwrap();
        workbook.save(input.join("q1.sales.xlsx")).unwrap();

        let report = BatchConverter::new(&input, &output).unwrap().run().unwrap();

        let expected_output = output.join("q1.sales.md");
        assert_eq!(
            report.converted,
            vec![BatchEntry {
                input: input.join("q1.sales.xlsx"),
                output: expected_output.clone(),
            }]
        );
        assert!(report.failed.is_empty());

        // Advancedモード、数式コメントあり
        let markdown = std::fs::read_to_string(&expected_output).unwrap();
        assert_eq!(
            markdown,
            "| **Item** | Total |\n\
             | :--- | :--- |\n\
             | pen | 3 |\n\
             | sum | 6 <!-- Formula: =B2*2 --> |\n\n\n"
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = BatchReport {
            converted: vec![BatchEntry {
                input: PathBuf::from("a.xlsx"),
                output: PathBuf::from("a.md"),
            }],
            failed: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["converted"][0]["output"], "a.md");
        assert!(json["failed"].as_array().unwrap().is_empty());
    }
}
