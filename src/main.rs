//! sheetdown CLI - spreadsheet to Markdown converter

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetdown::{BatchConverter, ConversionMode, ConverterBuilder, SheetSelector};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetdown")]
#[command(author, version, about = "Convert spreadsheets to Markdown tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single workbook to Markdown
    Convert {
        /// Input spreadsheet file (xlsx, xlsm, xlsb, xls, ods)
        input: PathBuf,

        /// Output Markdown file (default: input path with .md extension)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Sheet name to convert; repeat for several (default: all sheets)
        #[arg(short, long = "sheet", value_name = "SHEET")]
        sheets: Vec<String>,

        /// Plain table dump without merged cells, emphasis or alignment
        #[arg(long)]
        basic: bool,

        /// Append formula text as HTML comments (advanced mode)
        #[arg(short, long)]
        formulas: bool,

        /// Include a row index column (basic mode)
        #[arg(short, long)]
        index: bool,

        /// Write Markdown to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Convert every spreadsheet in a directory
    Batch {
        /// Directory to scan for spreadsheets
        #[arg(long, default_value = "input")]
        input_dir: PathBuf,

        /// Directory for the generated Markdown files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Do not append formula comments
        #[arg(long)]
        no_formulas: bool,

        /// Plain table dump without merged cells, emphasis or alignment
        #[arg(long)]
        basic: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(io::stderr)
            .init();
    }

    match cli.command {
        Commands::Convert {
            input,
            output,
            sheets,
            basic,
            formulas,
            index,
            stdout,
        } => {
            let output = if stdout {
                None
            } else {
                Some(output.unwrap_or_else(|| input.with_extension("md")))
            };
            convert(&input, output.as_deref(), sheets, mode(basic), formulas, index)
        }
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Batch {
            input_dir,
            output_dir,
            no_formulas,
            basic,
            json,
        } => batch(input_dir, output_dir, mode(basic), !no_formulas, json),
    }
}

fn mode(basic: bool) -> ConversionMode {
    if basic {
        ConversionMode::Basic
    } else {
        ConversionMode::Advanced
    }
}

fn open_input(input: &Path) -> Result<File> {
    File::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn convert(
    input: &Path,
    output: Option<&Path>,
    sheets: Vec<String>,
    mode: ConversionMode,
    formulas: bool,
    index: bool,
) -> Result<()> {
    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::from_names(sheets))
        .with_mode(mode)
        .include_formulas(formulas)
        .include_index(index)
        .build()
        .context("Invalid conversion options")?;

    match output {
        Some(path) => {
            converter
                .convert_file(input, path)
                .with_context(|| format!("Failed to convert '{}'", input.display()))?;
            eprintln!("Converted {} -> {}", input.display(), path.display());
        }
        None => {
            let markdown = converter
                .convert_to_string(open_input(input)?)
                .with_context(|| format!("Failed to convert '{}'", input.display()))?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(markdown.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let converter = ConverterBuilder::new().build()?;
    let names = converter
        .sheet_names(open_input(input)?)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    for (i, name) in names.iter().enumerate() {
        println!("{}: {}", i, name);
    }

    Ok(())
}

fn batch(
    input_dir: PathBuf,
    output_dir: PathBuf,
    mode: ConversionMode,
    formulas: bool,
    json: bool,
) -> Result<()> {
    let converter = ConverterBuilder::new()
        .with_mode(mode)
        .include_formulas(formulas)
        .build()?;
    let report = BatchConverter::with_converter(input_dir, output_dir, converter)
        .run()
        .context("Batch conversion failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report.converted {
        println!("ok    {} -> {}", entry.input.display(), entry.output.display());
    }
    for failure in &report.failed {
        println!("error {}: {}", failure.input.display(), failure.error);
    }
    println!(
        "Converted: {}, Failed: {}",
        report.success_count(),
        report.error_count()
    );

    Ok(())
}
