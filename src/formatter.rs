//! Formatter Module
//!
//! セル値をMarkdownテーブルのセル文字列に変換するモジュール。
//! 値の文字列化、Markdown特殊文字のエスケープ、強調マーカーの付与、数式コメントの生成を行います。

use chrono::Timelike;

use crate::types::{CellStyle, CellValue};

/// セルフォーマッター
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CellFormatter;

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self
    }

    /// 値を文字列化（空セルの場合は`None`）
    ///
    /// - 整数: そのまま（`9007199254740993`）
    /// - 数値: 整数値は小数点なし（`90`）、それ以外は最短表現（`90.5`）
    /// - 論理値: `True` / `False`
    /// - 日時: `YYYY-MM-DD HH:MM:SS`、マイクロ秒がある場合は`.ffffff`を付与
    pub fn stringify(&self, value: &CellValue) -> Option<String> {
        let text = match value {
            CellValue::Int(i) => i.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::DateTime(dt) => {
                if dt.nanosecond() / 1_000 == 0 {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
                }
            }
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => return None,
        };
        Some(text)
    }

    /// Markdown特殊文字をエスケープ
    ///
    /// パイプはテーブルの列区切りと衝突するため`\|`に、改行は`<br>`に置換します。
    pub fn escape_markdown(&self, s: &str) -> String {
        s.replace('|', "\\|")
            .replace("\r\n", "<br>")
            .replace(['\n', '\r'], "<br>")
    }

    /// 太字・斜体の強調マーカーを付与
    ///
    /// 太字を先に適用し、その外側を斜体で囲みます（`***text***`）。
    pub fn emphasize(&self, text: String, style: CellStyle) -> String {
        let mut text = text;
        if style.bold {
            text = format!("**{}**", text);
        }
        if style.italic {
            text = format!("*{}*", text);
        }
        text
    }

    /// セル値をMarkdownのセル文字列に変換
    ///
    /// 空セルは書式に関係なく空文字列になります。
    pub fn format_cell(&self, value: &CellValue, style: CellStyle) -> String {
        match self.stringify(value) {
            Some(text) => self.emphasize(self.escape_markdown(&text), style),
            None => String::new(),
        }
    }

    /// 書式なしでセル値を変換（エスケープのみ）
    pub fn format_plain(&self, value: &CellValue) -> String {
        self.stringify(value)
            .map(|text| self.escape_markdown(&text))
            .unwrap_or_default()
    }

    /// 数式をHTMLコメントとして表現
    ///
    /// 数式はHTMLエスケープ（`& < > " '`、`'`は`&#x27;`）した上で、パイプを`\|`に置換します。
    /// 戻り値は先頭にスペースを1つ含みます（例: ` <!-- Formula: =A1&amp;B1 -->`）。
    pub fn formula_comment(&self, formula: &str) -> String {
        // `&`は先にエスケープ済みのため、`&apos;`が元の文字列に由来することはない
        let escaped = quick_xml::escape::escape(formula).replace("&apos;", "&#x27;");
        format!(" <!-- Formula: {} -->", escaped.replace('|', "\\|"))
    }
}
