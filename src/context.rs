//! Context Extractor Module
//!
//! 取引ヘッダー行から明細テーブルヘッダーまでのキー・値ブロックを走査し、
//! 取引単位のコンテキスト（取引番号、会計日など）を抽出する。

use indexmap::IndexMap;

use crate::classifier::{classify_row, has_label, label_position, RowKind, ACCOUNTING_CLASS};
use crate::types::{CellValue, JournalRecord, Row};

/// コンテキストとして抽出する既知のキー（抽出順）
pub const CONTEXT_KEYS: [&str; 7] = [
    "Transaction Number",
    "Event Class",
    "Event Type",
    "Ledger",
    "Accounting Date",
    "Transaction Date",
    "Source",
];

/// 取引単位のコンテキスト
///
/// 既知のキーごとに最初に見つかった値のみを保持します。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionContext {
    values: IndexMap<&'static str, CellValue>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// 1行分のキー・値ペアを取り込む（既に値のあるキーは無視）
    fn absorb_row(&mut self, row: &[CellValue]) {
        for key in CONTEXT_KEYS {
            if self.values.contains_key(key) {
                continue;
            }
            let Some(label_idx) = label_position(row, key) else {
                continue;
            };
            if let Some(value) = row[label_idx + 1..].iter().find(|v| !v.is_absent()) {
                self.values.insert(key, value.clone());
            }
        }
    }

    /// コンテキストを明細レコードにマージする
    ///
    /// 明細テーブル自身の列と同名のキーは上書きしません。
    pub fn merge_into(&self, record: &mut JournalRecord) {
        for (key, value) in &self.values {
            record.insert_if_missing(key, value);
        }
    }
}

/// 取引コンテキストを抽出する
///
/// `start_index`（この行を含む）から前方に走査し、以下のいずれかで停止します。
///
/// - 明細テーブルヘッダー行（`LineTableHeader`）
/// - `start_index`より後ろにある取引ヘッダー行（`TxnHeader`）
/// - 行の終端
///
/// # 戻り値
///
/// `(コンテキスト, 停止した行のインデックス)`。停止行は消費されないため、
/// 呼び出し側で再ディスパッチできます。
pub fn extract_context(rows: &[Row], start_index: usize) -> (TransactionContext, usize) {
    let mut context = TransactionContext::new();
    let mut index = start_index;

    while index < rows.len() {
        let row = &rows[index];
        match classify_row(row) {
            RowKind::LineTableHeader => break,
            RowKind::TxnHeader if index > start_index => break,
            _ => {}
        }
        context.absorb_row(row);
        // 取引ヘッダー行が明細ヘッダーを兼ねる場合はその行で停止する
        if index == start_index && has_label(row, ACCOUNTING_CLASS) {
            break;
        }
        index += 1;
    }

    (context, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(*c)
                }
            })
            .collect()
    }

    #[test]
    fn test_extract_until_line_header() {
        let rows = vec![
            row(&["Transaction Number", "", "INV-1001", "", "Ledger", "US Primary"]),
            row(&["Event Class", "Invoices", "", "Event Type", "", "Invoice Validated"]),
            row(&["Accounting Date", "2024-01-31", "Source", "Payables"]),
            row(&["Line", "Accounting Class", "Account"]),
            row(&["1", "Liability", "01-000-2210"]),
        ];

        let (context, next) = extract_context(&rows, 0);

        assert_eq!(next, 3);
        assert_eq!(context.len(), 6);
        assert_eq!(
            context.get("Transaction Number"),
            Some(&CellValue::from("INV-1001"))
        );
        assert_eq!(context.get("Ledger"), Some(&CellValue::from("US Primary")));
        assert_eq!(context.get("Event Class"), Some(&CellValue::from("Invoices")));
        assert_eq!(
            context.get("Event Type"),
            Some(&CellValue::from("Invoice Validated"))
        );
        assert_eq!(
            context.get("Accounting Date"),
            Some(&CellValue::from("2024-01-31"))
        );
        assert_eq!(context.get("Source"), Some(&CellValue::from("Payables")));
        assert_eq!(context.get("Transaction Date"), None);
    }

    #[test]
    fn test_extract_stops_before_next_transaction() {
        let rows = vec![
            row(&["Transaction Number", "A-1"]),
            row(&["Ledger", "L1"]),
            row(&["Transaction Number", "A-2"]),
            row(&["Ledger", "L2"]),
        ];

        let (context, next) = extract_context(&rows, 0);

        assert_eq!(next, 2);
        assert_eq!(context.get("Transaction Number"), Some(&CellValue::from("A-1")));
        assert_eq!(context.get("Ledger"), Some(&CellValue::from("L1")));
    }

    #[test]
    fn test_extract_runs_to_end_of_input() {
        let rows = vec![row(&["Transaction Number", "A-1"]), row(&["Source", "Manual"])];

        let (context, next) = extract_context(&rows, 0);

        assert_eq!(next, rows.len());
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_extract_keeps_first_value() {
        let rows = vec![
            row(&["Transaction Number", "A-1"]),
            row(&["Ledger", "First"]),
            row(&["Ledger", "Second"]),
        ];

        let (context, _) = extract_context(&rows, 0);

        assert_eq!(context.get("Ledger"), Some(&CellValue::from("First")));
    }

    #[test]
    fn test_label_without_value_is_skipped() {
        let rows = vec![row(&["Transaction Number", "A-1", "Source", "", ""])];

        let (context, _) = extract_context(&rows, 0);

        assert_eq!(context.get("Source"), None);
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_typed_values_are_kept() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = vec![vec![
            CellValue::from("Transaction Number"),
            CellValue::Number(55012.0),
            CellValue::from("Accounting Date"),
            CellValue::DateTime(date),
        ]];

        let (context, _) = extract_context(&rows, 0);

        assert_eq!(
            context.get("Transaction Number"),
            Some(&CellValue::Number(55012.0))
        );
        assert_eq!(context.get("Accounting Date"), Some(&CellValue::DateTime(date)));
    }

    #[test]
    fn test_header_row_with_line_label_stops_in_place() {
        let rows = vec![
            row(&["Transaction Number", "A-1", "Accounting Class"]),
            row(&["", "Revenue"]),
        ];

        let (context, next) = extract_context(&rows, 0);

        assert_eq!(next, 0);
        assert_eq!(context.get("Transaction Number"), Some(&CellValue::from("A-1")));
    }

    #[test]
    fn test_merge_does_not_clobber_columns() {
        let rows = vec![row(&["Transaction Number", "A-1", "Ledger", "Context Ledger"])];
        let (context, _) = extract_context(&rows, 0);

        let mut record: JournalRecord = vec![
            ("Line", CellValue::from("1")),
            ("Ledger", CellValue::from("Column Ledger")),
        ]
        .into_iter()
        .collect();
        context.merge_into(&mut record);

        assert_eq!(record.get("Ledger"), Some(&CellValue::from("Column Ledger")));
        assert_eq!(
            record.get("Transaction Number"),
            Some(&CellValue::from("A-1"))
        );
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["Line", "Ledger", "Transaction Number"]);
    }
}
