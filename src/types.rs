//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! 座標はExcelと同じく1始まり（A1 = (1, 1)）です。

use std::fmt;

use chrono::NaiveDateTime;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 整数（i64）
    Int(i64),

    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日時
    DateTime(NaiveDateTime),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル（null）
    Empty,
}

impl CellValue {
    /// 値が空（null）かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 数式文字列（`=`で始まる文字列）であれば、その文字列を返す
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::String(s) if s.starts_with('=') => Some(s),
            _ => None,
        }
    }

    /// 数値として扱える値かどうか
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Number(_))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// セル座標（1始まり）
///
/// 行優先で順序付けされるため、`BTreeMap`のキーとして使うと行→列の順に走査できます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (1, 1) -> "A1"）
    pub fn to_a1_notation(self) -> String {
        format!("{}{}", Self::col_index_to_letter(self.col), self.row)
    }

    /// A1形式の文字列から座標を生成（例: "B3" -> (3, 2)）
    ///
    /// `$`による絶対参照指定は無視します。不正な形式の場合は`None`を返します。
    pub fn from_a1_notation(s: &str) -> Option<Self> {
        let s = s.trim().replace('$', "");
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for ch in letters.chars() {
            let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(val)?;
        }

        let row = digits.parse::<u32>().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self::new(row, col))
    }

    /// 列番号を文字列に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
    fn col_index_to_letter(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;
        while n > 0 {
            let remainder = (n - 1) % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            n = (n - 1) / 26;
        }
        result
    }
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// "A1:C3"形式の文字列から範囲を生成
    ///
    /// 単一セル参照（"B2"）は1×1の範囲として扱います。
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once(':') {
            Some((start, end)) => Some(Self::new(
                CellCoord::from_a1_notation(start)?,
                CellCoord::from_a1_notation(end)?,
            )),
            None => {
                let coord = CellCoord::from_a1_notation(s)?;
                Some(Self::new(coord, coord))
            }
        }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }
}

/// `A1:C2`形式（単一セルは`B2`）
impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.to_a1_notation())
        } else {
            write!(
                f,
                "{}:{}",
                self.start.to_a1_notation(),
                self.end.to_a1_notation()
            )
        }
    }
}

/// セル結合範囲の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRegion {
    /// 結合範囲
    pub range: CellRange,

    /// 親セル（左上セル）の座標
    pub anchor: CellCoord,
}

impl MergedRegion {
    /// 新しい結合範囲を生成
    pub fn new(range: CellRange) -> Self {
        Self {
            anchor: range.start,
            range,
        }
    }

    /// 指定された座標が結合範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.range.contains(coord)
    }

    /// 指定された座標が親セルかどうか
    pub fn is_anchor(&self, coord: CellCoord) -> bool {
        self.anchor == coord
    }
}

/// 水平方向の配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// 左揃え（未指定時のデフォルト）
    #[default]
    Left,
    /// 中央揃え
    Center,
    /// 右揃え
    Right,
}

impl Alignment {
    /// `<alignment horizontal="...">`属性値から変換
    ///
    /// `center`と`right`以外（`general`、`justify`、`centerContinuous`など）は左揃えです。
    pub fn from_horizontal(value: &str) -> Self {
        match value {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// Markdown区切り行のマーカー
    pub fn marker(self) -> &'static str {
        match self {
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
            Alignment::Left => ":---",
        }
    }
}

/// セルの書式情報（太字、斜体、水平配置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
}

impl CellStyle {
    /// 太字のスタイルを返す
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// 斜体のスタイルを返す
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// 配置を指定したスタイルを返す
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}
