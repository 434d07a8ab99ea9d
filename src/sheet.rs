//! Sheet Module
//!
//! 1シート分の読み込み済みデータを保持するモジュール。
//! 生の内容（数式を含む）と計算済みの表示値を、2つの独立した読み取り専用ビューとして持ちます。

use std::collections::{BTreeMap, HashMap};

use crate::types::{CellCoord, CellRange, CellStyle, CellValue, MergedRegion};

/// 座標→値の疎なビュー
///
/// 空セルは格納しません。行優先順で走査できます。
#[derive(Debug, Clone, Default)]
pub struct CellView {
    cells: BTreeMap<CellCoord, CellValue>,
}

impl CellView {
    /// 空のビューを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を設定（`CellValue::Empty`の場合は削除）
    pub fn set(&mut self, coord: CellCoord, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, value);
        }
    }

    /// 値を取得（未設定の場合は`None`）
    pub fn get(&self, coord: CellCoord) -> Option<&CellValue> {
        self.cells.get(&coord)
    }

    /// 空でないセルを行優先順に走査
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellValue)> {
        self.cells.iter().map(|(coord, value)| (*coord, value))
    }

    /// 空でないセルの数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// 空でないセルが存在しないかどうか
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// 読み込み済みのシート
///
/// # ビュー
///
/// - `raw`: セルに格納された生の内容。数式セルは`=`で始まる数式文字列
/// - `values`: 計算済み（キャッシュされた）表示値
///
/// 両ビューは変換中に変更されません。
///
/// # 使用例
///
/// ```rust
/// use sheetdown::{CellCoord, CellStyle, Sheet};
///
/// let mut sheet = Sheet::new("Sheet1");
/// sheet.set_value(CellCoord::new(1, 1), "Total");
/// sheet.set_formula(CellCoord::new(2, 1), "=SUM(B1:B9)", 42.0);
/// sheet.set_style(CellCoord::new(1, 1), CellStyle::default().bold());
/// assert_eq!(sheet.name(), "Sheet1");
/// ```
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    raw: CellView,
    values: CellView,
    styles: HashMap<CellCoord, CellStyle>,
    merged_regions: Vec<MergedRegion>,
}

impl Sheet {
    /// 空のシートを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: CellView::new(),
            values: CellView::new(),
            styles: HashMap::new(),
            merged_regions: Vec::new(),
        }
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 定数値を設定（生の内容と表示値は同じ）
    pub fn set_value(&mut self, coord: CellCoord, value: impl Into<CellValue>) {
        let value = value.into();
        self.raw.set(coord, value.clone());
        self.values.set(coord, value);
    }

    /// 数式とそのキャッシュ値を設定
    ///
    /// `formula`が`=`で始まらない場合は先頭に付与します。
    pub fn set_formula(&mut self, coord: CellCoord, formula: &str, cached: impl Into<CellValue>) {
        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        self.raw.set(coord, CellValue::String(formula));
        self.values.set(coord, cached.into());
    }

    /// 書式を設定
    pub fn set_style(&mut self, coord: CellCoord, style: CellStyle) {
        self.styles.insert(coord, style);
    }

    /// 結合範囲を追加
    pub fn add_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(MergedRegion::new(range));
    }

    /// 生の内容ビュー
    pub fn raw_view(&self) -> &CellView {
        &self.raw
    }

    /// 表示値ビュー
    pub fn value_view(&self) -> &CellView {
        &self.values
    }

    /// 生の内容（未設定の場合は`Empty`）
    pub fn raw_value(&self, coord: CellCoord) -> &CellValue {
        self.raw.get(coord).unwrap_or(&CellValue::Empty)
    }

    /// 表示値（未設定の場合は`Empty`）
    pub fn display_value(&self, coord: CellCoord) -> &CellValue {
        self.values.get(coord).unwrap_or(&CellValue::Empty)
    }

    /// 書式（未設定の場合はデフォルト）
    pub fn style(&self, coord: CellCoord) -> CellStyle {
        self.styles.get(&coord).copied().unwrap_or_default()
    }

    /// 結合範囲のリスト
    pub fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }
}
