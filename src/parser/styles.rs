//! Style Sheet Parser Module
//!
//! XLSX内部のXMLからセル書式（太字・斜体・水平配置）を抽出するモジュール。
//! calamineは書式情報を公開しないため、`xl/styles.xml`とワークシートXMLを直接解析します。

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::SheetToMdError;
use crate::security::{validate_zip_path, SecurityConfig};
use crate::types::{Alignment, CellCoord, CellStyle};

/// フォント情報（`<fonts>`要素）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FontFlags {
    bold: bool,
    italic: bool,
}

/// セルスタイル情報（`<cellXfs>`要素）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CellXf {
    font_id: usize,
    alignment: Alignment,
}

/// `xl/styles.xml`の解析結果
///
/// スタイルID（セルの`s`属性）から`CellStyle`を引くためのテーブルです。
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    fonts: Vec<FontFlags>,
    cell_xfs: Vec<CellXf>,
}

impl StyleSheet {
    /// `xl/styles.xml`の内容を解析
    pub fn parse(xml: &[u8]) -> Result<Self, SheetToMdError> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut in_fonts = false;
        let mut in_cell_xfs = false;
        let mut current_font: Option<FontFlags> = None;
        let mut current_xf: Option<CellXf> = None;

        loop {
            buf.clear();
            let (element, self_closing) = match reader.read_event_into(&mut buf)? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(e) => {
                    match e.local_name().as_ref() {
                        b"fonts" => in_fonts = false,
                        b"cellXfs" => in_cell_xfs = false,
                        b"font" if in_fonts => {
                            sheet.fonts.extend(current_font.take());
                        }
                        b"xf" if in_cell_xfs => {
                            sheet.cell_xfs.extend(current_xf.take());
                        }
                        _ => {}
                    }
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            match element.local_name().as_ref() {
                b"fonts" => in_fonts = !self_closing,
                b"cellXfs" => in_cell_xfs = !self_closing,
                b"font" if in_fonts => {
                    if self_closing {
                        sheet.fonts.push(FontFlags::default());
                    } else {
                        current_font = Some(FontFlags::default());
                    }
                }
                b"b" => {
                    if let Some(font) = current_font.as_mut() {
                        font.bold = flag_value(&element)?;
                    }
                }
                b"i" => {
                    if let Some(font) = current_font.as_mut() {
                        font.italic = flag_value(&element)?;
                    }
                }
                b"xf" if in_cell_xfs => {
                    // <xf numFmtId="0" fontId="1" applyFont="1">
                    let mut xf = CellXf::default();
                    if let Some(font_id) = attribute(&element, b"fontId")? {
                        xf.font_id = font_id.parse()?;
                    }
                    if self_closing {
                        sheet.cell_xfs.push(xf);
                    } else {
                        current_xf = Some(xf);
                    }
                }
                b"alignment" => {
                    if let Some(xf) = current_xf.as_mut() {
                        if let Some(horizontal) = attribute(&element, b"horizontal")? {
                            xf.alignment = Alignment::from_horizontal(&horizontal);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(sheet)
    }

    /// スタイルIDから書式を取得
    ///
    /// 未定義のIDは既定の書式として扱います。
    pub fn cell_style(&self, style_id: usize) -> CellStyle {
        let Some(xf) = self.cell_xfs.get(style_id) else {
            return CellStyle::default();
        };
        let font = self.fonts.get(xf.font_id).copied().unwrap_or_default();
        CellStyle {
            bold: font.bold,
            italic: font.italic,
            alignment: xf.alignment,
        }
    }
}

/// ワークブック全体のセル書式
///
/// シート名ごとに、既定以外の書式を持つセルだけを保持します。
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkbookStyles {
    sheets: HashMap<String, HashMap<CellCoord, CellStyle>>,
}

impl WorkbookStyles {
    /// XLSXアーカイブから全シートのセル書式を読み込む
    pub fn load<R: Read + Seek>(
        reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, SheetToMdError> {
        let mut archive = ZipArchive::new(reader)?;
        security.check_archive(&mut archive)?;

        let style_sheet = match read_part(&mut archive, "xl/styles.xml")? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };

        let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?.unwrap_or_default();
        let rels_xml =
            read_part(&mut archive, "xl/_rels/workbook.xml.rels")?.unwrap_or_default();
        let relationships = parse_relationships(&rels_xml)?;

        let mut sheets = HashMap::new();
        for (name, rel_id) in parse_sheet_entries(&workbook_xml)? {
            let Some(target) = relationships.get(&rel_id) else {
                tracing::debug!(sheet = %name, rel_id = %rel_id, "worksheet relationship not found");
                continue;
            };
            let part = resolve_target(target);
            validate_zip_path(&part).map_err(|e| {
                SheetToMdError::SecurityViolation(format!("Invalid worksheet path: {}", e))
            })?;

            let Some(xml) = read_part(&mut archive, &part)? else {
                continue;
            };
            sheets.insert(name, parse_cell_styles(&xml, &style_sheet)?);
        }

        Ok(Self { sheets })
    }

    /// シートのセル書式を取り出す
    pub fn take_sheet(&mut self, sheet_name: &str) -> HashMap<CellCoord, CellStyle> {
        self.sheets.remove(sheet_name).unwrap_or_default()
    }
}

/// アーカイブ内のファイルを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>, SheetToMdError> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// 属性値を取得（エスケープ解除済み）
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SheetToMdError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = quick_xml::escape::unescape(raw)
                .map_err(|e| SheetToMdError::Xml(format!("XML attribute error: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// `<b/>`、`<i val="0"/>`形式のフラグ要素を解釈
fn flag_value(element: &BytesStart<'_>) -> Result<bool, SheetToMdError> {
    Ok(match attribute(element, b"val")? {
        Some(val) => !matches!(val.as_str(), "0" | "false"),
        None => true,
    })
}

/// `xl/_rels/workbook.xml.rels`からId -> Targetの対応を取得
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, SheetToMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// `xl/workbook.xml`から(シート名, リレーションシップID)をワークブック順に取得
fn parse_sheet_entries(xml: &[u8]) -> Result<Vec<(String, String)>, SheetToMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut entries = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
                if let (Some(name), Some(rel_id)) = (attribute(&e, b"name")?, attribute(&e, b"id")?)
                {
                    entries.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// リレーションシップのTargetをアーカイブ内パスに変換
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// ワークシートXMLから各セルのスタイルIDを読み取り、書式に変換
fn parse_cell_styles(
    xml: &[u8],
    style_sheet: &StyleSheet,
) -> Result<HashMap<CellCoord, CellStyle>, SheetToMdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut styles = HashMap::new();
    let mut current_row = 0u32;
    let mut last_col = 0u32;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = match attribute(&e, b"r")? {
                        Some(r) => r.parse()?,
                        None => current_row + 1,
                    };
                    last_col = 0;
                }
                b"c" => {
                    // <c r="B2" s="3" t="s">
                    let coord = match attribute(&e, b"r")? {
                        Some(reference) => CellCoord::from_a1_notation(&reference).ok_or_else(
                            || SheetToMdError::Xml(format!("Invalid cell reference: {}", reference)),
                        )?,
                        None => CellCoord::new(current_row.max(1), last_col + 1),
                    };
                    last_col = coord.col;

                    if let Some(style_id) = attribute(&e, b"s")? {
                        let style = style_sheet.cell_style(style_id.parse()?);
                        if style != CellStyle::default() {
                            styles.insert(coord, style);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}
