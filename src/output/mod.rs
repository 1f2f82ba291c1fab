//! Output Module
//!
//! 抽出結果を出力テーブルにまとめ、Strategy Patternで各出力フォーマットへ
//! 書き出すモジュール。

mod formatters;

use indexmap::IndexSet;
use std::io::Write;

use crate::builder::ExtractionConfig;
use crate::error::LedgerZeroError;
use crate::types::{CellValue, JournalRecord};

pub use formatters::*;

/// 処理済み明細の出力シート名
pub const PROCESSED_SHEET: &str = "Journal Entries Processed";

/// エラー明細の出力シート名
pub const ERRORED_SHEET: &str = "Journal Entries Errored";

const PLACEHOLDER_COLUMN: &str = "Message";
const NO_PROCESSED_MESSAGE: &str = "No processed entries found";
const NO_ERRORED_MESSAGE: &str = "No errored entries found";

/// 出力テーブル
///
/// 列はレコード内で最初に出現した順に並びます。あるレコードに存在しない列は
/// 空セルとして出力されます。
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    name: String,
    columns: Vec<String>,
    records: Vec<JournalRecord>,
}

impl OutputTable {
    pub fn new(name: impl Into<String>, records: Vec<JournalRecord>) -> Self {
        let columns: IndexSet<&str> = records.iter().flat_map(JournalRecord::columns).collect();
        let columns = columns.into_iter().map(str::to_string).collect();

        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    /// 明細がない場合のプレースホルダーテーブル（`Message`列1行）
    pub fn placeholder(name: impl Into<String>, message: &str) -> Self {
        let mut record = JournalRecord::new();
        record.insert(PLACEHOLDER_COLUMN, CellValue::from(message));
        Self::new(name, vec![record])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[JournalRecord] {
        &self.records
    }

    /// セル値を取得（列がないレコードは`Empty`）
    pub(crate) fn cell(&self, record: &JournalRecord, column: &str) -> CellValue {
        record.get(column).cloned().unwrap_or(CellValue::Empty)
    }
}

/// 抽出結果を出力テーブルにまとめる
///
/// 常に処理済み・エラーの順で2つのテーブルを返します。明細がない側は
/// プレースホルダーのメッセージ行になります。
///
/// # 使用例
///
/// ```rust
/// use ledgerzero::{assemble, ERRORED_SHEET, PROCESSED_SHEET};
///
/// let tables = assemble(Vec::new(), Vec::new());
/// assert_eq!(tables[0].name(), PROCESSED_SHEET);
/// assert_eq!(tables[1].name(), ERRORED_SHEET);
/// assert_eq!(tables[1].columns(), ["Message"]);
/// ```
pub fn assemble(processed: Vec<JournalRecord>, errored: Vec<JournalRecord>) -> Vec<OutputTable> {
    let processed = if processed.is_empty() {
        OutputTable::placeholder(PROCESSED_SHEET, NO_PROCESSED_MESSAGE)
    } else {
        OutputTable::new(PROCESSED_SHEET, processed)
    };
    let errored = if errored.is_empty() {
        OutputTable::placeholder(ERRORED_SHEET, NO_ERRORED_MESSAGE)
    } else {
        OutputTable::new(ERRORED_SHEET, errored)
    };

    vec![processed, errored]
}

/// 出力フォーマッター（Strategy Pattern）
///
/// 各出力フォーマット（XLSX, JSON, CSV）をenumとして表現します。
#[derive(Debug, Clone, Copy)]
pub enum OutputFormatter {
    Xlsx,
    Json,
    Csv,
}

impl OutputFormatter {
    /// 出力フォーマットからフォーマッターを生成
    pub fn from_format(format: crate::api::OutputFormat) -> Self {
        match format {
            crate::api::OutputFormat::Xlsx => OutputFormatter::Xlsx,
            crate::api::OutputFormat::Json => OutputFormatter::Json,
            crate::api::OutputFormat::Csv => OutputFormatter::Csv,
        }
    }

    /// テーブルを指定されたフォーマットで出力する
    ///
    /// # 引数
    ///
    /// * `tables` - 出力するテーブル
    /// * `writer` - 出力先のライター
    /// * `config` - 日付形式・列幅上限などの出力設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 出力に成功した場合
    /// * `Err(LedgerZeroError)` - エラーが発生した場合
    pub fn render<W: Write>(
        &self,
        tables: &[OutputTable],
        writer: &mut W,
        config: &ExtractionConfig,
    ) -> Result<(), LedgerZeroError> {
        match self {
            OutputFormatter::Xlsx => XlsxFormatter::new(config).render(tables, writer),
            OutputFormatter::Json => JsonFormatter::new(config).render(tables, writer),
            OutputFormatter::Csv => CsvFormatter::new(config).render(tables, writer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> JournalRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let table = OutputTable::new(
            PROCESSED_SHEET,
            vec![
                record(&[("Line", "1"), ("Accounting Class", "Revenue")]),
                record(&[("Line", "2"), ("Amount", "10"), ("Accounting Class", "Tax")]),
            ],
        );

        assert_eq!(table.columns(), ["Line", "Accounting Class", "Amount"]);
        assert_eq!(
            table.cell(&table.records()[0], "Amount"),
            CellValue::Empty
        );
    }

    #[test]
    fn test_assemble_with_placeholders() {
        let tables = assemble(vec![record(&[("Line", "1")])], Vec::new());

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].records().len(), 1);
        assert_eq!(tables[0].columns(), ["Line"]);

        let errored = &tables[1];
        assert_eq!(errored.name(), ERRORED_SHEET);
        assert_eq!(errored.records().len(), 1);
        assert_eq!(
            errored.records()[0].get("Message"),
            Some(&CellValue::from("No errored entries found"))
        );
    }

    #[test]
    fn test_assemble_both_empty() {
        let tables = assemble(Vec::new(), Vec::new());
        assert_eq!(
            tables[0].records()[0].get("Message"),
            Some(&CellValue::from("No processed entries found"))
        );
    }
}
