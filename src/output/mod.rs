//! Output Module
//!
//! 変換モードごとのシートレンダラーを切り替えるモジュール（Strategy Pattern）。

mod advanced;
mod basic;

pub use advanced::{render_sheet, SheetRenderer};
pub use basic::BasicRenderer;

use crate::api::ConversionMode;
use crate::builder::ConversionConfig;
use crate::sheet::Sheet;

/// 出力レンダラー
///
/// 各変換モード（Advanced, Basic）をenumとして表現します。
#[derive(Debug, Clone, Copy)]
pub(crate) enum OutputFormatter {
    Advanced(SheetRenderer),
    Basic(BasicRenderer),
}

impl OutputFormatter {
    /// 変換設定からレンダラーを生成
    pub fn from_config(config: &ConversionConfig) -> Self {
        match config.mode {
            ConversionMode::Advanced => {
                OutputFormatter::Advanced(SheetRenderer::new(config.include_formulas))
            }
            ConversionMode::Basic => OutputFormatter::Basic(BasicRenderer::new(config.include_index)),
        }
    }

    /// シートを1つのMarkdown文字列に変換
    pub fn render(&self, sheet: &Sheet) -> String {
        match self {
            OutputFormatter::Advanced(renderer) => renderer.render(sheet),
            OutputFormatter::Basic(renderer) => renderer.render(sheet),
        }
    }
}
