//! Grid Module
//!
//! レンダリング前に1回だけ計算するシート全体の構造情報を提供するモジュール。
//!
//! - [`SheetBounds`]: データを含む行の範囲と列数（バウンディングボックス）
//! - [`MergeMap`]: 座標から結合セル上の役割（親セル / 子セル）への写像

use std::collections::{BTreeSet, HashMap};

use crate::sheet::{CellView, Sheet};
use crate::types::{CellCoord, MergedRegion};

/// データを含む領域
///
/// 1回のレンダリング中は不変で、ヘッダー行・区切り行・データ行のすべてで同じ値を使用します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetBounds {
    /// 最初のデータ行
    pub min_row: u32,

    /// 最後のデータ行
    pub max_row: u32,

    /// データ行に現れる最大の列番号
    pub max_cols: u32,

    /// データを含む行（昇順）
    data_rows: BTreeSet<u32>,
}

impl SheetBounds {
    /// ビューを走査してバウンディングボックスを算出
    ///
    /// 空でない値を1つでも含む行をデータ行とします。
    /// データ行が1つもない場合は`None`を返します。
    pub fn scan(view: &CellView) -> Option<Self> {
        let mut data_rows = BTreeSet::new();
        let mut max_cols = 0;

        for (coord, _) in view.iter() {
            data_rows.insert(coord.row);
            max_cols = max_cols.max(coord.col);
        }

        let min_row = *data_rows.first()?;
        let max_row = *data_rows.last()?;

        Some(Self {
            min_row,
            max_row,
            max_cols,
            data_rows,
        })
    }

    /// ヘッダー行より後のデータ行（データのない行は含まない）
    pub fn body_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.data_rows.range(self.min_row + 1..).copied()
    }

    /// 1..=max_colsの列番号
    pub fn columns(&self) -> impl Iterator<Item = u32> {
        1..=self.max_cols
    }
}

/// 結合セル上の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeRole {
    /// 結合範囲の親セル（左上）
    Anchor,

    /// 親セル以外の結合範囲内セル
    Member,
}

/// 座標→結合セル上の役割のマッピング
///
/// シートごとに1回だけ構築し、セルごとの結合範囲の線形走査を不要にします。
#[derive(Debug, Clone, Default)]
pub(crate) struct MergeMap {
    roles: HashMap<CellCoord, MergeRole>,
}

impl MergeMap {
    /// 結合範囲のリストから構築
    ///
    /// 出力されるセル（データ行 × `1..=max_cols`）だけを登録します。
    /// 範囲は重ならない前提です。重なった場合は親セルの役割を優先します。
    pub fn build(merged_regions: &[MergedRegion], bounds: &SheetBounds) -> Self {
        let mut roles = HashMap::new();

        for region in merged_regions {
            let first_row = region.range.start.row.max(bounds.min_row);
            let last_row = region.range.end.row.min(bounds.max_row);
            // BTreeSet::rangeは開始 > 終了でpanicする
            if first_row > last_row {
                continue;
            }
            let last_col = region.range.end.col.min(bounds.max_cols);

            for &row in bounds.data_rows.range(first_row..=last_row) {
                for col in region.range.start.col..=last_col {
                    let coord = CellCoord::new(row, col);
                    let role = if region.is_anchor(coord) {
                        MergeRole::Anchor
                    } else {
                        MergeRole::Member
                    };
                    roles
                        .entry(coord)
                        .and_modify(|existing| {
                            if role == MergeRole::Anchor {
                                *existing = role;
                            }
                        })
                        .or_insert(role);
                }
            }
        }

        Self { roles }
    }

    /// シートの結合範囲から構築
    pub fn for_sheet(sheet: &Sheet, bounds: &SheetBounds) -> Self {
        Self::build(sheet.merged_regions(), bounds)
    }

    /// 座標の役割（結合範囲外の場合は`None`）
    pub fn role(&self, coord: CellCoord) -> Option<MergeRole> {
        self.roles.get(&coord).copied()
    }

    /// 親セル以外の結合範囲内セルかどうか
    pub fn is_hidden(&self, coord: CellCoord) -> bool {
        self.role(coord) == Some(MergeRole::Member)
    }
}
