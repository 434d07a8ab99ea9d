//! Advanced Markdown Renderer
//!
//! 結合セル・太字/斜体・水平配置・数式コメントを反映してシートをMarkdownテーブルに変換します。
//!
//! 処理は2パスです。
//!
//! 1. バウンディング: 生の内容ビューを走査し、データ行と列数を確定する
//! 2. 出力: ヘッダー行、区切り行、データ行の順に書き出す

use tracing::debug;

use crate::formatter::CellFormatter;
use crate::grid::{MergeMap, SheetBounds};
use crate::sheet::Sheet;
use crate::types::CellCoord;

/// データを含まないシートの代替出力
pub(crate) fn empty_sheet_marker(sheet_name: &str) -> String {
    format!("## {}\n\n*Empty sheet*\n\n", sheet_name)
}

/// 書式を反映するシートレンダラー
///
/// 入力のみに依存する純粋な変換で、副作用はありません。
#[derive(Debug, Clone, Copy)]
pub struct SheetRenderer {
    formatter: CellFormatter,
    include_formulas: bool,
}

impl SheetRenderer {
    /// 新しいレンダラーを生成
    ///
    /// * `include_formulas` - `true`の場合、数式セルの後ろに`<!-- Formula: ... -->`を付与する
    pub fn new(include_formulas: bool) -> Self {
        Self {
            formatter: CellFormatter::new(),
            include_formulas,
        }
    }

    /// シートをMarkdownテーブルに変換
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use sheetdown::{Alignment, CellCoord, CellStyle, Sheet, SheetRenderer};
    ///
    /// let mut sheet = Sheet::new("Sheet1");
    /// let header = CellStyle::default().bold().aligned(Alignment::Center);
    /// sheet.set_value(CellCoord::new(1, 1), "Name");
    /// sheet.set_style(CellCoord::new(1, 1), header);
    /// sheet.set_value(CellCoord::new(2, 1), "Alice");
    ///
    /// let markdown = SheetRenderer::new(false).render(&sheet);
    /// assert_eq!(markdown, "| **Name** |\n| :---: |\n| Alice |\n");
    /// ```
    pub fn render(&self, sheet: &Sheet) -> String {
        let Some(bounds) = SheetBounds::scan(sheet.raw_view()) else {
            debug!(sheet = sheet.name(), "sheet has no data");
            return empty_sheet_marker(sheet.name());
        };

        debug!(
            sheet = sheet.name(),
            min_row = bounds.min_row,
            max_row = bounds.max_row,
            max_cols = bounds.max_cols,
            "rendering sheet"
        );

        let merges = MergeMap::for_sheet(sheet, &bounds);
        let mut out = String::new();

        // ヘッダー行（数式コメントは付与しない）
        let header: Vec<String> = bounds
            .columns()
            .map(|col| self.render_cell(sheet, &merges, CellCoord::new(bounds.min_row, col), false))
            .collect();
        push_row(&mut out, &header);

        // 区切り行（ヘッダー行の配置に従う）
        let markers: Vec<&str> = bounds
            .columns()
            .map(|col| {
                sheet
                    .style(CellCoord::new(bounds.min_row, col))
                    .alignment
                    .marker()
            })
            .collect();
        out.push('|');
        for marker in markers {
            out.push(' ');
            out.push_str(marker);
            out.push_str(" |");
        }
        out.push('\n');

        for row in bounds.body_rows() {
            let cells: Vec<String> = bounds
                .columns()
                .map(|col| {
                    self.render_cell(sheet, &merges, CellCoord::new(row, col), self.include_formulas)
                })
                .collect();
            push_row(&mut out, &cells);
        }

        out
    }

    /// 1セル分の文字列を生成
    fn render_cell(
        &self,
        sheet: &Sheet,
        merges: &MergeMap,
        coord: CellCoord,
        with_formula: bool,
    ) -> String {
        if merges.is_hidden(coord) {
            return String::new();
        }

        let mut text = self
            .formatter
            .format_cell(sheet.display_value(coord), sheet.style(coord));

        if with_formula {
            if let Some(formula) = sheet.raw_value(coord).as_formula() {
                text.push_str(&self.formatter.formula_comment(formula));
            }
        }

        text
    }
}

impl Default for SheetRenderer {
    fn default() -> Self {
        Self::new(false)
    }
}

/// シートをMarkdownテーブルに変換する
///
/// `SheetRenderer::new(include_formulas).render(sheet)`の省略形です。
pub fn render_sheet(sheet: &Sheet, include_formulas: bool) -> String {
    SheetRenderer::new(include_formulas).render(sheet)
}

/// `| a | b |`形式の1行を追加
fn push_row(out: &mut String, cells: &[String]) {
    out.push_str("| ");
    out.push_str(&cells.join(" | "));
    out.push_str(" |\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alignment, CellRange, CellStyle};

    fn coord(row: u32, col: u32) -> CellCoord {
        CellCoord::new(row, col)
    }

    /// Name/Scoreの例: 1行目がヘッダー、3行目が空行
    fn score_sheet() -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        let header = CellStyle::default().bold().aligned(Alignment::Center);

        sheet.set_value(coord(1, 1), "Name");
        sheet.set_value(coord(1, 2), "Score");
        sheet.set_style(coord(1, 1), header);
        sheet.set_style(coord(1, 2), header);

        sheet.set_value(coord(2, 1), "Alice");
        sheet.set_value(coord(2, 2), 90.0);

        sheet.set_value(coord(4, 1), "Bob");
        sheet.set_value(coord(4, 2), 85.0);
        sheet
    }

    fn column_count(line: &str) -> usize {
        // エスケープされたパイプは列区切りではない
        let unescaped = line.replace("\\|", "");
        unescaped.matches('|').count() - 1
    }

    #[test]
    fn test_score_example() {
        let markdown = render_sheet(&score_sheet(), false);
        let expected = "\
| **Name** | **Score** |
| :---: | :---: |
| Alice | 90 |
| Bob | 85 |
";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_empty_sheet_marker() {
        let sheet = Sheet::new("Blank");
        assert_eq!(render_sheet(&sheet, true), "## Blank\n\n*Empty sheet*\n\n");
    }

    #[test]
    fn test_style_only_cells_do_not_bear_data() {
        let mut sheet = Sheet::new("Styled");
        sheet.set_style(coord(1, 1), CellStyle::default().bold());
        assert_eq!(render_sheet(&sheet, false), empty_sheet_marker("Styled"));
    }

    #[test]
    fn test_alignment_row_follows_header() {
        let mut sheet = Sheet::new("Align");
        sheet.set_value(coord(2, 1), "L");
        sheet.set_value(coord(2, 2), "C");
        sheet.set_value(coord(2, 3), "R");
        sheet.set_style(coord(2, 2), CellStyle::default().aligned(Alignment::Center));
        sheet.set_style(coord(2, 3), CellStyle::default().aligned(Alignment::Right));
        // データ行の配置は区切り行に影響しない
        sheet.set_value(coord(3, 1), "x");
        sheet.set_style(coord(3, 1), CellStyle::default().aligned(Alignment::Right));

        let markdown = render_sheet(&sheet, false);
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[1], "| :--- | :---: | ---: |");
    }

    #[test]
    fn test_rows_padded_to_max_cols() {
        let mut sheet = Sheet::new("Ragged");
        sheet.set_value(coord(1, 1), "A");
        sheet.set_value(coord(2, 1), "short");
        sheet.set_value(coord(3, 4), "wide");

        let markdown = render_sheet(&sheet, false);
        for line in markdown.lines() {
            assert_eq!(column_count(line), 4, "line: {}", line);
        }
        assert!(markdown.contains("| short |  |  |  |\n"));
    }

    #[test]
    fn test_merged_members_render_empty() {
        let mut sheet = Sheet::new("Merged");
        sheet.set_value(coord(1, 1), "Title");
        // 子セルに値が残っていても出力しない
        sheet.set_value(coord(1, 2), "ghost");
        sheet.set_value(coord(1, 3), "Other");
        sheet.add_merged_region(CellRange::parse("A1:B1").unwrap());
        sheet.set_value(coord(2, 1), "v1");
        sheet.set_value(coord(2, 2), "v2");
        sheet.set_value(coord(3, 1), "block");
        sheet.set_value(coord(4, 2), "hidden");
        sheet.add_merged_region(CellRange::parse("A3:B4").unwrap());

        let markdown = render_sheet(&sheet, false);
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[0], "| Title |  | Other |");
        assert_eq!(lines[2], "| v1 | v2 |  |");
        assert_eq!(lines[3], "| block |  |  |");
        assert_eq!(lines[4], "|  |  |  |");
        assert!(!markdown.contains("ghost"));
        assert!(!markdown.contains("hidden"));
    }

    #[test]
    fn test_merge_larger_than_data() {
        let mut sheet = Sheet::new("Huge");
        sheet.set_value(coord(1, 1), "Title");
        sheet.set_value(coord(2, 1), "x");
        sheet.add_merged_region(CellRange::parse("A1:XFD20000").unwrap());

        assert_eq!(render_sheet(&sheet, false), "| Title |\n| :--- |\n|  |\n");
    }

    #[test]
    fn test_pipe_escaped_without_extra_columns() {
        let mut sheet = Sheet::new("Pipes");
        sheet.set_value(coord(1, 1), "a|b");
        sheet.set_value(coord(1, 2), "c");
        sheet.set_value(coord(2, 1), "x||y");
        sheet.set_value(coord(2, 2), "multi\nline");

        let markdown = render_sheet(&sheet, false);
        assert!(markdown.contains("a\\|b"));
        assert!(markdown.contains("x\\|\\|y"));
        assert!(markdown.contains("multi<br>line"));
        for line in markdown.lines() {
            assert_eq!(column_count(line), 2, "line: {}", line);
        }
    }

    #[test]
    fn test_formula_comment_in_data_rows() {
        let mut sheet = Sheet::new("Calc");
        sheet.set_value(coord(1, 1), "Total");
        sheet.set_formula(coord(2, 1), "=SUM(A1:A2)", 30.0);

        let with = render_sheet(&sheet, true);
        assert!(with.contains("| 30 <!-- Formula: =SUM(A1:A2) --> |"));

        let without = render_sheet(&sheet, false);
        assert!(!without.contains("<!--"));
        assert!(without.contains("| 30 |"));
    }

    #[test]
    fn test_formula_comment_skipped_in_header() {
        let mut sheet = Sheet::new("Calc");
        sheet.set_formula(coord(1, 1), "=\"Head\"", "Head");
        sheet.set_value(coord(2, 1), 1.0);

        let markdown = render_sheet(&sheet, true);
        assert!(markdown.starts_with("| Head |\n"));
        assert!(!markdown.contains("<!--"));
    }

    #[test]
    fn test_formula_without_cached_value_bears_data() {
        let mut sheet = Sheet::new("Calc");
        sheet.set_value(coord(1, 1), "H");
        sheet.set_formula(coord(2, 1), "=NOW()", crate::types::CellValue::Empty);

        let markdown = render_sheet(&sheet, true);
        assert!(markdown.ends_with("|  <!-- Formula: =NOW() --> |\n"));
    }

    #[test]
    fn test_emphasis_on_data_cells() {
        let mut sheet = Sheet::new("Emphasis");
        sheet.set_value(coord(1, 1), "H");
        sheet.set_value(coord(2, 1), "both");
        sheet.set_style(coord(2, 1), CellStyle::default().bold().italic());
        sheet.set_style(coord(3, 1), CellStyle::default().bold());
        sheet.set_value(coord(3, 2), "x");

        let markdown = render_sheet(&sheet, false);
        assert!(markdown.contains("| ***both*** |  |"));
        // 空セルには強調マーカーを付けない
        assert!(markdown.contains("|  | x |"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_every_row_has_max_cols_cells(
                cells in proptest::collection::vec((1u32..12, 1u32..8, "[a-z|\\n ]{0,6}"), 1..40)
            ) {
                let mut sheet = Sheet::new("Prop");
                let mut max_col = 0;
                for (row, col, text) in &cells {
                    sheet.set_value(CellCoord::new(*row, *col), text.as_str());
                    max_col = max_col.max(*col);
                }

                let markdown = render_sheet(&sheet, false);
                let lines: Vec<&str> = markdown.lines().collect();
                prop_assert!(lines.len() >= 2);
                for line in lines {
                    prop_assert_eq!(column_count(line), max_col as usize);
                }
            }
        }
    }
}
