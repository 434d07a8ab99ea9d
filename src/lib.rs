//! sheetdown - Spreadsheet to Markdown converter
//!
//! This crate converts spreadsheet workbooks (XLSX, XLSM, XLSB, XLS, ODS) into
//! GitHub-flavored Markdown tables. The default advanced mode honors merged
//! cells, bold/italic emphasis and horizontal alignment, and can annotate
//! formula cells with their formula text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetdown::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // Convert a workbook to a Markdown file
//!     converter.convert_file("example.xlsx", "example.md")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetdown::{ConversionMode, ConverterBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Budget".to_string()))
//!         .with_mode(ConversionMode::Advanced)
//!         .include_formulas(true)  // <!-- Formula: =SUM(B2:B9) -->
//!         .build()?;
//!
//!     let markdown = converter.convert_to_string(File::open("example.xlsx")?)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Rendering an in-memory sheet
//!
//! ```rust
//! use sheetdown::{render_sheet, CellCoord, CellStyle, Sheet};
//!
//! let mut sheet = Sheet::new("Scores");
//! sheet.set_value(CellCoord::new(1, 1), "Name");
//! sheet.set_style(CellCoord::new(1, 1), CellStyle::default().bold());
//! sheet.set_value(CellCoord::new(2, 1), "Alice");
//!
//! assert_eq!(
//!     render_sheet(&sheet, false),
//!     "| **Name** |\n| :--- |\n| Alice |\n"
//! );
//! ```
//!
//! # Batch conversion
//!
//! ```rust,no_run
//! use sheetdown::BatchConverter;
//!
//! # fn main() -> Result<(), sheetdown::SheetToMdError> {
//! let report = BatchConverter::new("input", "output")?.run()?;
//! println!("{} converted", report.success_count());
//! # Ok(())
//! # }
//! ```

mod api;
mod batch;
mod builder;
mod error;
mod formatter;
mod grid;
mod output;
mod parser;
mod security;
mod sheet;
mod types;

// 公開API
pub use api::{ConversionMode, SheetSelector};
pub use batch::{BatchConverter, BatchEntry, BatchFailure, BatchReport};
pub use builder::{Converter, ConverterBuilder};
pub use error::SheetToMdError;
pub use output::{render_sheet, BasicRenderer, SheetRenderer};
pub use sheet::{CellView, Sheet};
pub use types::{Alignment, CellCoord, CellRange, CellStyle, CellValue, MergedRegion};
