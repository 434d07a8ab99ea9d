//! Basic Markdown Renderer
//!
//! シートの使用範囲全体をそのまま表に書き出すシンプルな変換。
//! 1行目を列見出しとし、列幅を揃えたパイプテーブルを出力します。
//! 書式・結合セル・数式は考慮しません。

use unicode_width::UnicodeWidthStr;

use crate::formatter::CellFormatter;
use crate::output::advanced::empty_sheet_marker;
use crate::sheet::Sheet;
use crate::types::{Alignment, CellCoord, CellValue};

/// 表示値の使用範囲（空でないセルを囲む最小の矩形）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UsedRange {
    min_row: u32,
    max_row: u32,
    min_col: u32,
    max_col: u32,
}

impl UsedRange {
    fn of(sheet: &Sheet) -> Option<Self> {
        let mut iter = sheet.value_view().iter();
        let (first, _) = iter.next()?;
        let mut range = Self {
            min_row: first.row,
            max_row: first.row,
            min_col: first.col,
            max_col: first.col,
        };
        for (coord, _) in iter {
            range.min_row = range.min_row.min(coord.row);
            range.max_row = range.max_row.max(coord.row);
            range.min_col = range.min_col.min(coord.col);
            range.max_col = range.max_col.max(coord.col);
        }
        Some(range)
    }
}

/// 使用範囲をそのまま出力するレンダラー
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRenderer {
    formatter: CellFormatter,
    include_index: bool,
}

impl BasicRenderer {
    /// 新しいレンダラーを生成
    ///
    /// * `include_index` - `true`の場合、先頭に0始まりの行番号列を追加する
    pub fn new(include_index: bool) -> Self {
        Self {
            formatter: CellFormatter::new(),
            include_index,
        }
    }

    /// シートをMarkdownテーブルに変換
    pub fn render(&self, sheet: &Sheet) -> String {
        let Some(range) = UsedRange::of(sheet) else {
            return empty_sheet_marker(sheet.name());
        };

        let mut columns: Vec<Column> = (range.min_col..=range.max_col)
            .enumerate()
            .map(|(offset, col)| {
                let header_value = sheet.display_value(CellCoord::new(range.min_row, col));
                let header = if header_value.is_empty() {
                    format!("Unnamed: {}", offset)
                } else {
                    self.formatter.format_plain(header_value)
                };

                let values: Vec<&CellValue> = (range.min_row + 1..=range.max_row)
                    .map(|row| sheet.display_value(CellCoord::new(row, col)))
                    .collect();

                let numeric = values.iter().any(|v| !v.is_empty())
                    && values.iter().all(|v| v.is_empty() || v.is_numeric());

                Column {
                    header,
                    cells: values
                        .into_iter()
                        .map(|v| self.formatter.format_plain(v))
                        .collect(),
                    alignment: if numeric {
                        Alignment::Right
                    } else {
                        Alignment::Left
                    },
                }
            })
            .collect();

        if self.include_index {
            let rows = range.max_row - range.min_row;
            columns.insert(
                0,
                Column {
                    header: String::new(),
                    cells: (0..rows).map(|i| i.to_string()).collect(),
                    alignment: Alignment::Right,
                },
            );
        }

        render_table(&columns)
    }
}

/// 1列分の出力データ
#[derive(Debug)]
struct Column {
    header: String,
    cells: Vec<String>,
    alignment: Alignment,
}

impl Column {
    /// 列幅（表示幅、最小3）
    fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.width())
            .chain(std::iter::once(self.header.width()))
            .fold(3, usize::max)
    }
}

/// 列幅を揃えたパイプテーブルを生成
fn render_table(columns: &[Column]) -> String {
    let widths: Vec<usize> = columns.iter().map(Column::width).collect();
    let row_count = columns.first().map(|c| c.cells.len()).unwrap_or(0);
    let mut out = String::new();

    // ヘッダー行
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| pad(&column.header, width, column.alignment))
        .collect();
    push_padded_row(&mut out, &header);

    // 区切り行
    out.push('|');
    for (column, &width) in columns.iter().zip(&widths) {
        let dashes = "-".repeat(width + 1);
        match column.alignment {
            Alignment::Right => {
                out.push_str(&dashes);
                out.push(':');
            }
            Alignment::Center => {
                out.push(':');
                out.push_str(&"-".repeat(width));
                out.push(':');
            }
            Alignment::Left => {
                out.push(':');
                out.push_str(&dashes);
            }
        }
        out.push('|');
    }
    out.push('\n');

    // データ行
    for row in 0..row_count {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| pad(&column.cells[row], width, column.alignment))
            .collect();
        push_padded_row(&mut out, &cells);
    }

    out
}

/// 表示幅に基づいてセル内容を埋める
fn pad(content: &str, width: usize, alignment: Alignment) -> String {
    let fill = width.saturating_sub(content.width());
    match alignment {
        Alignment::Right => format!("{}{}", " ".repeat(fill), content),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), content, " ".repeat(fill - left))
        }
        Alignment::Left => format!("{}{}", content, " ".repeat(fill)),
    }
}

fn push_padded_row(out: &mut String, cells: &[String]) {
    out.push_str("| ");
    out.push_str(&cells.join(" | "));
    out.push_str(" |\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellRange, CellStyle};

    fn coord(row: u32, col: u32) -> CellCoord {
        CellCoord::new(row, col)
    }

    fn score_sheet() -> Sheet {
        let mut sheet = Sheet::new("Scores");
        sheet.set_value(coord(1, 1), "Name");
        sheet.set_value(coord(1, 2), "Score");
        sheet.set_value(coord(2, 1), "Alice");
        sheet.set_value(coord(2, 2), 90.0);
        sheet.set_value(coord(3, 1), "Bob");
        sheet.set_value(coord(3, 2), 85.5);
        sheet
    }

    #[test]
    fn test_basic_table_layout() {
        let markdown = BasicRenderer::new(false).render(&score_sheet());
        let expected = "\
| Name  | Score |
|:------|------:|
| Alice |    90 |
| Bob   |  85.5 |
";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn test_basic_with_index() {
        let markdown = BasicRenderer::new(true).render(&score_sheet());
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[0], "|     | Name  | Score |");
        assert_eq!(lines[1], "|----:|:------|------:|");
        assert_eq!(lines[2], "|   0 | Alice |    90 |");
        assert_eq!(lines[3], "|   1 | Bob   |  85.5 |");
    }

    #[test]
    fn test_basic_unnamed_headers_and_blank_rows() {
        let mut sheet = Sheet::new("Gaps");
        sheet.set_value(coord(2, 2), "Key");
        sheet.set_value(coord(3, 2), "a");
        sheet.set_value(coord(3, 3), "b");
        sheet.set_value(coord(5, 2), "c");

        let markdown = BasicRenderer::new(false).render(&sheet);
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[0], "| Key | Unnamed: 1 |");
        // 使用範囲内の空行も出力する
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "|     |            |");
    }

    #[test]
    fn test_basic_ignores_formatting_and_merges() {
        let mut sheet = score_sheet();
        sheet.set_style(coord(1, 1), CellStyle::default().bold());
        sheet.add_merged_region(CellRange::parse("A1:B1").unwrap());

        let markdown = BasicRenderer::new(false).render(&sheet);
        assert!(!markdown.contains("**"));
        assert!(markdown.starts_with("| Name  | Score |"));
    }

    #[test]
    fn test_basic_wide_characters() {
        let mut sheet = Sheet::new("Wide");
        sheet.set_value(coord(1, 1), "名前");
        sheet.set_value(coord(2, 1), "山田太郎");

        let markdown = BasicRenderer::new(false).render(&sheet);
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[0], "| 名前     |");
        assert_eq!(lines[2], "| 山田太郎 |");
    }

    #[test]
    fn test_basic_empty_sheet() {
        let sheet = Sheet::new("Nothing");
        assert_eq!(
            BasicRenderer::new(true).render(&sheet),
            "## Nothing\n\n*Empty sheet*\n\n"
        );
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(pad("ab", 4, Alignment::Right), "  ab");
        assert_eq!(pad("ab", 5, Alignment::Center), " ab  ");
        assert_eq!(pad("abcdef", 3, Alignment::Left), "abcdef");
    }
}
