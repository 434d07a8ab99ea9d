//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// sheetdownクレート全体で使用するエラー型
///
/// ワークブックの読み込み、シート選択、スタイル解析、Markdown出力の
/// すべてのエラーを統一的に扱います。
///
/// レンダリング処理そのものはエラーを返しません。書式メタデータが欠落・破損している
/// 場合はデフォルト値（左揃え、太字なし、斜体なし）で処理を続行します。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetdown::SheetToMdError;
/// use std::fs::File;
///
/// fn read_workbook(path: &str) -> Result<(), SheetToMdError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum SheetToMdError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    ///
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが原因です。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// 数値の解析エラー（スタイルID、行番号など）
    #[error("Number parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLパートの解析エラー
    #[error("XML error: {0}")]
    Xml(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時の検証エラーや、範囲外のシートインデックスなど。
    ///
    /// ```rust,no_run
    /// use sheetdown::{ConverterBuilder, SheetSelector, SheetToMdError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Names(vec![]))
    ///     .build();
    ///
    /// if let Err(SheetToMdError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 要求されたシートがワークブックに存在しない
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、ファイルサイズ制限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<quick_xml::Error> for SheetToMdError {
    fn from(e: quick_xml::Error) -> Self {
        SheetToMdError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SheetToMdError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        SheetToMdError::Xml(format!("XML attribute error: {}", e))
    }
}

impl From<zip::result::ZipError> for SheetToMdError {
    fn from(e: zip::result::ZipError) -> Self {
        SheetToMdError::Zip(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for SheetToMdError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        SheetToMdError::Utf8(e.utf8_error())
    }
}
