//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use indexmap::IndexMap;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::{json, Value};
use std::io::Write;
use unicode_width::UnicodeWidthStr;

use super::OutputTable;
use crate::builder::ExtractionConfig;
use crate::error::LedgerZeroError;
use crate::formatter::{has_time, to_excel_serial, CellFormatter};
use crate::types::CellValue;

const DATE_NUM_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// 列幅に加える余白（文字数）
const COLUMN_PADDING: f64 = 2.0;

/// XLSX形式のフォーマッター
///
/// テーブルごとに1シートを作成し、1行目に太字のヘッダーを書き込みます。
/// 数値・真偽値・日付は型を保ったまま書き込まれます。
pub struct XlsxFormatter {
    cell_formatter: CellFormatter,
    max_column_width: f64,
}

impl XlsxFormatter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            // 列幅の計測はセルの表示形式（ISO日付）に合わせる
            cell_formatter: CellFormatter::default(),
            max_column_width: config.max_column_width,
        }
    }

    pub fn render<W: Write>(
        &self,
        tables: &[OutputTable],
        writer: &mut W,
    ) -> Result<(), LedgerZeroError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);
        let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);

        for table in tables {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(table.name())?;

            for (col, column) in table.columns().iter().enumerate() {
                let col = to_col_index(col)?;
                worksheet.write_string_with_format(0, col, column, &header_format)?;
            }

            for (row, record) in table.records().iter().enumerate() {
                let row = to_row_index(row + 1)?;
                for (col, column) in table.columns().iter().enumerate() {
                    let col = to_col_index(col)?;
                    let value = table.cell(record, column);
                    write_cell(worksheet, row, col, &value, &date_format, &datetime_format)?;
                }
            }

            self.autofit_columns(worksheet, table)?;
        }

        let buffer = workbook.save_to_buffer()?;
        writer.write_all(&buffer)?;
        writer.flush()?;

        Ok(())
    }

    /// 各列の幅を内容の表示幅に合わせる（上限あり）
    fn autofit_columns(
        &self,
        worksheet: &mut Worksheet,
        table: &OutputTable,
    ) -> Result<(), LedgerZeroError> {
        for (col, column) in table.columns().iter().enumerate() {
            let content_width = table
                .records()
                .iter()
                .map(|record| {
                    let text = self.cell_formatter.format_cell(&table.cell(record, column));
                    UnicodeWidthStr::width(text.as_str())
                })
                .chain(std::iter::once(UnicodeWidthStr::width(column.as_str())))
                .max()
                .unwrap_or(0);

            let width = (content_width as f64 + COLUMN_PADDING).min(self.max_column_width);
            worksheet.set_column_width(to_col_index(col)?, width)?;
        }
        Ok(())
    }
}

/// セル値を型に応じて書き込む（不在の値は空セルのまま）
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    date_format: &Format,
    datetime_format: &Format,
) -> Result<(), LedgerZeroError> {
    if value.is_absent() {
        return Ok(());
    }

    match value {
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(dt) => {
            let format = if has_time(dt) { datetime_format } else { date_format };
            worksheet.write_number_with_format(row, col, to_excel_serial(dt), format)?;
        }
        CellValue::String(s) | CellValue::Error(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Empty => {}
    }
    Ok(())
}

fn to_row_index(row: usize) -> Result<u32, LedgerZeroError> {
    u32::try_from(row)
        .map_err(|_| LedgerZeroError::Config(format!("Row index {} exceeds worksheet limits", row)))
}

fn to_col_index(col: usize) -> Result<u16, LedgerZeroError> {
    u16::try_from(col).map_err(|_| {
        LedgerZeroError::Config(format!("Column index {} exceeds worksheet limits", col))
    })
}

/// JSON形式のフォーマッター
///
/// シート名をキー、レコードの配列を値とするオブジェクトを出力します。
/// 列の順序はテーブルの列順を保ち、不在の値は`null`になります。
pub struct JsonFormatter {
    cell_formatter: CellFormatter,
}

impl JsonFormatter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            cell_formatter: CellFormatter::new(config.date_format.clone()),
        }
    }

    pub fn render<W: Write>(
        &self,
        tables: &[OutputTable],
        writer: &mut W,
    ) -> Result<(), LedgerZeroError> {
        let output: IndexMap<&str, Vec<IndexMap<&str, Value>>> = tables
            .iter()
            .map(|table| {
                let records: Vec<IndexMap<&str, Value>> = table
                    .records()
                    .iter()
                    .map(|record| {
                        table
                            .columns()
                            .iter()
                            .map(|column| {
                                let value = table.cell(record, column);
                                (column.as_str(), self.to_json(&value))
                            })
                            .collect()
                    })
                    .collect();
                (table.name(), records)
            })
            .collect();

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(())
    }

    fn to_json(&self, value: &CellValue) -> Value {
        if value.is_absent() {
            return Value::Null;
        }
        match value {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                json!(*n as i64)
            }
            CellValue::Number(n) => json!(n),
            CellValue::Bool(b) => json!(b),
            other => json!(self.cell_formatter.format_cell(other)),
        }
    }
}

/// CSV形式のフォーマッター
///
/// 各テーブルを `# Sheet: <name>` 行に続けて出力し、テーブル間は空行で区切ります。
pub struct CsvFormatter {
    cell_formatter: CellFormatter,
}

impl CsvFormatter {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            cell_formatter: CellFormatter::new(config.date_format.clone()),
        }
    }

    pub fn render<W: Write>(
        &self,
        tables: &[OutputTable],
        writer: &mut W,
    ) -> Result<(), LedgerZeroError> {
        for (i, table) in tables.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "# Sheet: {}", table.name())?;

            let mut csv_writer = csv::Writer::from_writer(&mut *writer);
            csv_writer.write_record(table.columns())?;
            for record in table.records() {
                let fields: Vec<String> = table
                    .columns()
                    .iter()
                    .map(|column| self.cell_formatter.format_cell(&table.cell(record, column)))
                    .collect();
                csv_writer.write_record(&fields)?;
            }
            csv_writer.flush()?;
        }

        writer.flush()?;
        Ok(())
    }
}
