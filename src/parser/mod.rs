//! Parser Module
//!
//! calamineとquick-xmlを使用したスプレッドシート解析。
//! セル値・数式・結合セルはcalamine、セル書式はXMLから直接取得します。

mod styles;
mod workbook;

pub(crate) use workbook::WorkbookParser;
