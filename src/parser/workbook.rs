//! Workbook Parser Module
//!
//! calamineを使用したスプレッドシート解析の実装。
//! 表示値・数式・結合セル・書式を読み込み、`Sheet`モデルに変換します。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Dimensions, Range, Reader, Sheets};

use crate::api::SheetSelector;
use crate::error::SheetToMdError;
use crate::parser::styles::WorkbookStyles;
use crate::security::SecurityConfig;
use crate::sheet::Sheet;
use crate::types::{CellCoord, CellRange, CellValue};

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// XLSX形式の場合は`xl/styles.xml`からセル書式も取得します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX/XLSM/XLSB/XLS/ODS）
    workbook: Sheets<Cursor<Vec<u8>>>,
    /// セル書式（XLSX以外では空）
    styles: WorkbookStyles,
}

impl WorkbookParser {
    /// メモリ上のファイル内容からワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(SheetToMdError::Parse)` - 対応形式でない、または壊れている場合
    pub fn open(data: Vec<u8>, security: &SecurityConfig) -> Result<Self, SheetToMdError> {
        // 書式の解析はXLSX形式のみ（失敗しても値の変換は続行）
        let styles = if is_zip_archive(&data) {
            match WorkbookStyles::load(Cursor::new(data.as_slice()), security) {
                Ok(styles) => styles,
                Err(err @ SheetToMdError::SecurityViolation(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read cell styles, using defaults");
                    WorkbookStyles::default()
                }
            }
        } else {
            WorkbookStyles::default()
        };

        let workbook = open_workbook_auto_from_rs(Cursor::new(data))?;

        Ok(Self { workbook, styles })
    }

    /// すべてのシート名をワークブックの順序で取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト（指定順）
    /// * `Err(SheetToMdError::SheetNotFound)` - 指定名のシートが存在しない場合
    /// * `Err(SheetToMdError::Config)` - インデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, SheetToMdError> {
        let all_sheet_names = self.sheet_names();

        let by_index = |index: usize| {
            all_sheet_names.get(index).cloned().ok_or_else(|| {
                SheetToMdError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            })
        };
        let by_name = |name: &String| {
            if all_sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(SheetToMdError::SheetNotFound(name.clone()))
            }
        };

        match selector {
            SheetSelector::All => Ok(all_sheet_names.clone()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| by_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(by_name).collect(),
        }
    }

    /// シートを読み込み、`Sheet`モデルに変換
    ///
    /// 座標はすべて1始まりの絶対位置に変換されます。
    pub fn load_sheet(&mut self, sheet_name: &str) -> Result<Sheet, SheetToMdError> {
        if !self.sheet_names().iter().any(|name| name == sheet_name) {
            return Err(SheetToMdError::SheetNotFound(sheet_name.to_string()));
        }

        // 1. 表示値（数式セルはキャッシュ値）
        let values = self.workbook.worksheet_range(sheet_name)?;

        // 2. 数式（対応していない形式では空）
        let formulas = match self.workbook.worksheet_formula(sheet_name) {
            Ok(formulas) => Some(formulas),
            Err(e) => {
                tracing::debug!(sheet = sheet_name, error = %e, "formulas unavailable");
                None
            }
        };

        let mut sheet = Sheet::new(sheet_name);
        for (coord, value) in absolute_cells(&values) {
            sheet.set_value(coord, convert_value(value));
        }
        if let Some(formulas) = &formulas {
            for (coord, formula) in absolute_cells(formulas) {
                let cached = sheet.display_value(coord).clone();
                sheet.set_formula(coord, formula, cached);
            }
        }

        // 3. 結合セル範囲
        for dims in self.merged_regions(sheet_name)? {
            let range = CellRange::new(
                CellCoord::new(dims.start.0 + 1, dims.start.1 + 1),
                CellCoord::new(dims.end.0 + 1, dims.end.1 + 1),
            );
            tracing::trace!(sheet = sheet_name, range = %range, "merged region");
            sheet.add_merged_region(range);
        }

        // 4. セル書式
        for (coord, style) in self.styles.take_sheet(sheet_name) {
            sheet.set_style(coord, style);
        }

        tracing::debug!(
            sheet = sheet_name,
            cells = sheet.raw_view().len(),
            merged = sheet.merged_regions().len(),
            "loaded sheet"
        );

        Ok(sheet)
    }

    /// 結合セル範囲を取得（0始まり）
    fn merged_regions(&mut self, sheet_name: &str) -> Result<Vec<Dimensions>, SheetToMdError> {
        match &mut self.workbook {
            Sheets::Xlsx(xlsx) => {
                xlsx.load_merged_regions()
                    .map_err(|e| SheetToMdError::Parse(e.into()))?;
                match xlsx.worksheet_merge_cells(sheet_name) {
                    Some(Ok(regions)) => Ok(regions),
                    Some(Err(e)) => Err(SheetToMdError::Parse(e.into())),
                    None => Ok(Vec::new()),
                }
            }
            Sheets::Xls(xls) => Ok(xls.worksheet_merge_cells(sheet_name).unwrap_or_default()),
            _ => Ok(Vec::new()),
        }
    }
}

/// ZIPアーカイブ（XLSX/XLSM/ODS等）のシグネチャ判定
fn is_zip_archive(data: &[u8]) -> bool {
    data.starts_with(b"PK\x03\x04")
}

/// calamineの相対座標を1始まりの絶対座標に変換しながら空でないセルを列挙
fn absolute_cells<T>(range: &Range<T>) -> impl Iterator<Item = (CellCoord, &T)>
where
    T: calamine::CellType,
{
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range.used_cells().map(move |(row, col, value)| {
        (
            CellCoord::new(start_row + row as u32 + 1, start_col + col as u32 + 1),
            value,
        )
    })
}

/// calamineのセル値を`CellValue`に変換
fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::DateTime(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(
            convert_value(&Data::Int(9_007_199_254_740_993)),
            CellValue::Int(9_007_199_254_740_993)
        );
        assert_eq!(convert_value(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(
            convert_value(&Data::String("x".to_string())),
            CellValue::String("x".to_string())
        );
        assert_eq!(convert_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(convert_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_value(&Data::Error(CellErrorType::Div0)),
            CellValue::Error("#DIV/0!".to_string())
        );
    }

    #[test]
    fn test_absolute_cells_offset() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("a".to_string()));
        range.set_value((3, 2), Data::Int(1));

        let cells: Vec<(CellCoord, &Data)> = absolute_cells(&range).collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].0, CellCoord::new(3, 2));
        assert_eq!(cells[1].0, CellCoord::new(4, 3));
    }

    #[test]
    fn test_is_zip_archive() {
        assert!(is_zip_archive(b"PK\x03\x04rest"));
        assert!(!is_zip_archive(b"\xD0\xCF\x11\xE0"));
        assert!(!is_zip_archive(b""));
    }

    #[test]
    fn test_open_invalid_data() {
        let result = WorkbookParser::open(b"not a workbook".to_vec(), &SecurityConfig::default());
        assert!(result.is_err());
    }
}
