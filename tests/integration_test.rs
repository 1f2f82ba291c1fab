//! Integration Tests for ledgerzero
//!
//! End-to-end extraction from generated "Create Accounting" workbooks,
//! covering every output format and the file-to-file entry points.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use ledgerzero::{
    CellValue, ExtractorBuilder, LedgerZeroError, OutputFormat, SheetSelector, ERRORED_SHEET,
    PROCESSED_SHEET,
};
use rust_xlsxwriter::*;
use serde_json::Value;
use std::io::Cursor;
use std::path::PathBuf;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// A cell of a fixture row
    pub enum Cell {
        Text(&'static str),
        Number(f64),
        /// Excel serial date written with a `yyyy-mm-dd` number format
        Date(f64),
        Blank,
    }

    pub use Cell::{Blank, Date, Number, Text};

    pub fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<(), XlsxError> {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Text(s) => {
                        worksheet.write_string(r, c, *s)?;
                    }
                    Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Date(serial) => {
                        worksheet.write_number_with_format(r, c, *serial, &date_format)?;
                    }
                    Blank => {}
                }
            }
        }
        Ok(())
    }

    /// Standard report: one processed and one errored transaction.
    pub fn report_rows() -> Vec<Vec<Cell>> {
        vec![
            vec![Text("Create Accounting Report")],
            vec![],
            vec![Text("Journal Entries Processed")],
            vec![
                Text("Transaction Number"),
                Text("INV-100"),
                Blank,
                Text("Ledger"),
                Text("US Primary"),
            ],
            // 2024-01-31
            vec![Text("Accounting Date"), Date(45322.0)],
            vec![
                Text("Line"),
                Text("Accounting Class"),
                Text("Account"),
                Text("Entered Dr"),
                Text("Entered Cr"),
            ],
            vec![Number(1.0), Text("Liability"), Text("01-2210"), Blank, Number(500.0)],
            vec![Number(2.0), Text("Item Expense"), Text("01-6100"), Number(500.0)],
            vec![
                Text("Total for Journal Entry"),
                Blank,
                Blank,
                Number(500.0),
                Number(500.0),
            ],
            vec![],
            vec![Text("Journal Entries with Errors")],
            vec![
                Text("Transaction Number"),
                Text("INV-200"),
                Blank,
                Text("Source"),
                Text("Payables"),
            ],
            vec![
                Text("Line"),
                Text("Accounting Class"),
                Text("Account"),
                Text("Entered Dr"),
                Text("Entered Cr"),
            ],
            vec![Number(1.0), Text("Liability"), Text("01-2210"), Blank, Number(20.0)],
            vec![Number(2.0), Text("Item Expense"), Text("99-9999"), Number(20.0)],
            vec![Text("Line"), Text("Error Message")],
            vec![Text("2"), Text("The account 99-9999 is not valid.")],
            vec![
                Text("Total for Journal Entry"),
                Blank,
                Blank,
                Number(20.0),
                Number(20.0),
            ],
        ]
    }

    /// Workbook with a cover sheet and the report in "Sheet2"
    pub fn generate_report(rows: &[Vec<Cell>]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let cover = workbook.add_worksheet();
        cover.set_name("Sheet1")?;
        cover.write_string(0, 0, "Report parameters")?;

        let report = workbook.add_worksheet();
        report.set_name("Sheet2")?;
        write_rows(report, rows)?;

        Ok(workbook.save_to_buffer()?)
    }

    pub fn generate_standard_report() -> Result<Vec<u8>, XlsxError> {
        generate_report(&report_rows())
    }
}

/// Read an output sheet back as text rows
fn read_output_sheet(bytes: &[u8], sheet: &str) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

fn column(rows: &[Vec<String>], name: &str) -> usize {
    rows[0]
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("column {} missing from {:?}", name, rows[0]))
}

fn render(format: OutputFormat, input: Vec<u8>) -> Vec<u8> {
    let extractor = ExtractorBuilder::new()
        .with_output_format(format)
        .build()
        .unwrap();
    let mut output = Vec::new();
    extractor.convert(Cursor::new(input), &mut output).unwrap();
    output
}

#[test]
fn test_extract_standard_report() {
    let input = fixtures::generate_standard_report().unwrap();
    let extractor = ExtractorBuilder::new().build().unwrap();

    let report = extractor.extract(Cursor::new(input)).unwrap();

    assert_eq!(report.processed().len(), 2);
    assert_eq!(report.errored().len(), 2);

    let first = &report.processed()[0];
    assert_eq!(first.get("Line"), Some(&CellValue::Number(1.0)));
    assert_eq!(
        first.get("Transaction Number"),
        Some(&CellValue::from("INV-100"))
    );
    assert_eq!(first.get("Ledger"), Some(&CellValue::from("US Primary")));
    assert!(matches!(
        first.get("Accounting Date"),
        Some(CellValue::DateTime(_))
    ));

    // Line 2 (numeric) matches the error row whose Line is text "2"
    let errored = report.errored();
    assert_eq!(
        errored[1].get("Error"),
        Some(&CellValue::from("The account 99-9999 is not valid."))
    );
    assert_eq!(errored[1].get("Source"), Some(&CellValue::from("Payables")));
}

#[test]
fn test_xlsx_output_sheets() {
    let input = fixtures::generate_standard_report().unwrap();
    let output = render(OutputFormat::Xlsx, input);

    let workbook = open_workbook_auto_from_rs(Cursor::new(output.clone())).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![PROCESSED_SHEET.to_string(), ERRORED_SHEET.to_string()]
    );

    let processed = read_output_sheet(&output, PROCESSED_SHEET);
    assert_eq!(processed.len(), 3, "header plus two lines");
    let class = column(&processed, "Accounting Class");
    let txn = column(&processed, "Transaction Number");
    assert_eq!(processed[1][class], "Liability");
    assert_eq!(processed[2][class], "Item Expense");
    assert_eq!(processed[1][txn], "INV-100");
    assert_eq!(processed[2][txn], "INV-100");

    let errored = read_output_sheet(&output, ERRORED_SHEET);
    assert_eq!(errored.len(), 3);
    let error = column(&errored, "Error");
    assert_eq!(errored[2][error], "The account 99-9999 is not valid.");
}

#[test]
fn test_xlsx_output_has_no_total_rows() {
    let input = fixtures::generate_standard_report().unwrap();
    let output = render(OutputFormat::Xlsx, input);

    for sheet in [PROCESSED_SHEET, ERRORED_SHEET] {
        for row in read_output_sheet(&output, sheet) {
            for cell in row {
                assert!(!cell.contains("Total for Journal Entry"));
            }
        }
    }
}

#[test]
fn test_xlsx_placeholder_when_no_errors() {
    let rows: Vec<_> = fixtures::report_rows().into_iter().take(9).collect();
    let input = fixtures::generate_report(&rows).unwrap();
    let output = render(OutputFormat::Xlsx, input);

    let errored = read_output_sheet(&output, ERRORED_SHEET);
    assert_eq!(errored[0], vec!["Message".to_string()]);
    assert_eq!(errored[1], vec!["No errored entries found".to_string()]);
}

#[test]
fn test_json_output() {
    let input = fixtures::generate_standard_report().unwrap();
    let output = render(OutputFormat::Json, input);

    let value: Value = serde_json::from_slice(&output).unwrap();
    let processed = value[PROCESSED_SHEET].as_array().unwrap();
    let errored = value[ERRORED_SHEET].as_array().unwrap();

    assert_eq!(processed.len(), 2);
    assert_eq!(errored.len(), 2);
    assert_eq!(processed[0]["Line"], serde_json::json!(1));
    assert_eq!(processed[0]["Accounting Date"], "2024-01-31");
    assert_eq!(processed[0]["Entered Dr"], Value::Null);
    assert_eq!(errored[0]["Transaction Number"], "INV-200");
    // Line 1 has no matching error row; it falls back to every message in the transaction
    assert_eq!(errored[0]["Error"], "The account 99-9999 is not valid.");
}

#[test]
fn test_csv_output() {
    let input = fixtures::generate_standard_report().unwrap();
    let output = render(OutputFormat::Csv, input);
    let text = String::from_utf8(output).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("# Sheet: Journal Entries Processed"));
    assert!(lines
        .next()
        .unwrap()
        .starts_with("Line,Accounting Class,Account"));
    assert!(text.contains("\n\n# Sheet: Journal Entries Errored\n"));
    assert!(text.contains("99-9999 is not valid."));
}

#[test]
fn test_sheet_index_selector() {
    let input = fixtures::generate_standard_report().unwrap();
    let extractor = ExtractorBuilder::new()
        .with_sheet_selector(SheetSelector::Index(1))
        .build()
        .unwrap();

    let report = extractor.extract(Cursor::new(input)).unwrap();
    assert_eq!(report.processed().len(), 2);
}

#[test]
fn test_wrong_sheet_yields_empty_report() {
    // The cover sheet has no banners, so nothing is extracted
    let input = fixtures::generate_standard_report().unwrap();
    let extractor = ExtractorBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Sheet1".to_string()))
        .build()
        .unwrap();

    let report = extractor.extract(Cursor::new(input)).unwrap();
    assert!(report.processed().is_empty());
    assert!(report.errored().is_empty());
}

#[test]
fn test_convert_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("create_accounting.xlsx");
    let output_path = dir.path().join("Processed_create_accounting.xlsx");
    std::fs::write(&input_path, fixtures::generate_standard_report().unwrap()).unwrap();

    let extractor = ExtractorBuilder::new().build().unwrap();
    let summary = extractor.convert_file(&input_path, &output_path).unwrap();

    assert_eq!(summary.processed_lines, 2);
    assert_eq!(summary.errored_lines, 2);
    assert_eq!(summary.transactions, 2);
    assert_eq!(summary.sections_seen, 2);

    let output = std::fs::read(&output_path).unwrap();
    assert_eq!(read_output_sheet(&output, PROCESSED_SHEET).len(), 3);
}

#[test]
fn test_convert_files_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let report = fixtures::generate_standard_report().unwrap();

    let mut jobs: Vec<(PathBuf, PathBuf)> = (0..4)
        .map(|i| {
            let input = dir.path().join(format!("report_{}.xlsx", i));
            std::fs::write(&input, &report).unwrap();
            (input, dir.path().join(format!("Processed_report_{}.json", i)))
        })
        .collect();
    // One job with a missing input; it must not affect the others
    jobs.push((
        dir.path().join("missing.xlsx"),
        dir.path().join("Processed_missing.json"),
    ));

    let extractor = ExtractorBuilder::new()
        .with_output_format(OutputFormat::Json)
        .build()
        .unwrap();
    let results = extractor.convert_files(&jobs);

    assert_eq!(results.len(), 5);
    for result in &results[..4] {
        assert_eq!(result.as_ref().unwrap().processed_lines, 2);
    }
    assert!(matches!(results[4], Err(LedgerZeroError::Io(_))));
    assert!(jobs[..4].iter().all(|(_, output)| output.exists()));
    assert!(!jobs[4].1.exists());
}
