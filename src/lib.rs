//! ledgerzero - Journal entry extractor for "Create Accounting" reports
//!
//! This crate reads the multi-section "Create Accounting" report exported by the
//! general ledger (one spreadsheet sheet mixing banners, transaction headers,
//! line tables, error tables and total rows) and turns it into two flat tables:
//! every journal line that was processed, and every journal line that errored,
//! each enriched with its transaction header fields and, for errored lines,
//! the matching error messages.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ledgerzero::ExtractorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Read "Sheet2" and write an xlsx workbook with two sheets
//!     let extractor = ExtractorBuilder::new().build()?;
//!
//!     let summary = extractor.convert_file(
//!         "create_accounting.xlsx",
//!         "Processed_create_accounting.xlsx",
//!     )?;
//!     println!(
//!         "{} processed, {} errored",
//!         summary.processed_lines, summary.errored_lines
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use ledgerzero::{DateFormat, ExtractorBuilder, OutputFormat, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new()
//!         .with_sheet_selector(SheetSelector::Index(0))
//!         .with_output_format(OutputFormat::Json)
//!         .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
//!         .build()?;
//!
//!     let input = File::open("create_accounting.xlsx")?;
//!     extractor.convert(input, std::io::stdout())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Working with Rows Directly
//!
//! The extraction itself does not depend on any file format. Rows from any
//! source can be passed to [`parse_report`]:
//!
//! ```rust
//! use ledgerzero::{parse_report, CellValue};
//!
//! let rows = vec![
//!     vec![CellValue::from("Journal Entries Processed")],
//!     vec![
//!         CellValue::from("Transaction Number"),
//!         CellValue::from("INV-1"),
//!     ],
//!     vec![CellValue::from("Line"), CellValue::from("Accounting Class")],
//!     vec![CellValue::from("1"), CellValue::from("Revenue")],
//! ];
//!
//! let report = parse_report(&rows);
//! assert_eq!(report.processed().len(), 1);
//! assert_eq!(
//!     report.processed()[0].get("Transaction Number"),
//!     Some(&CellValue::from("INV-1"))
//! );
//! ```

mod api;
mod buffer;
mod builder;
mod classifier;
mod context;
mod error;
mod formatter;
mod output;
mod parser;
mod report;
mod security;
mod table;
mod types;

// 公開API
pub use api::{DateFormat, OutputFormat, SheetSelector, DEFAULT_SHEET_NAME};
pub use builder::{ExtractionConfig, Extractor, ExtractorBuilder, DEFAULT_MAX_COLUMN_WIDTH};
pub use error::LedgerZeroError;
pub use security::SecurityConfig;

// 抽出処理の構成要素
pub use buffer::{flush, FlushedLines, TransactionBuffer, ERROR_FIELD, ERROR_SEPARATOR};
pub use classifier::{classify_row, RowKind};
pub use context::{extract_context, TransactionContext, CONTEXT_KEYS};
pub use output::{assemble, OutputTable, ERRORED_SHEET, PROCESSED_SHEET};
pub use report::{parse_report, ExtractionSummary, JournalReport};
pub use table::{ingest_error_table, ingest_line_table, ingest_table, IngestedTable, TableKind};
pub use types::{CellValue, JournalRecord, Row, Section};
