//! Table Ingestor Module
//!
//! 明細テーブル・エラーテーブルのヘッダー行から列マップを構築し、
//! 後続のデータ行をレコードとして取り込む。

use std::collections::BTreeMap;

use crate::classifier::{
    classify_row, has_label, is_total_row, ACCOUNTING_CLASS, ERROR_MESSAGE, LINE,
};
use crate::types::{CellValue, JournalRecord, Row};

/// テーブルの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// 仕訳明細テーブル（"Accounting Class"ヘッダー）
    Line,

    /// エラーテーブル（"Error Message"ヘッダー）
    Error,
}

impl TableKind {
    /// レコードとして採用できるかを判定
    fn is_valid(self, record: &JournalRecord) -> bool {
        match self {
            TableKind::Line => record.has_value(LINE) || record.has_value(ACCOUNTING_CLASS),
            TableKind::Error => record.has_value(ERROR_MESSAGE),
        }
    }

    /// テーブルの終端を示す行か（その行は消費しない）
    fn terminates_at(self, row: &[CellValue]) -> bool {
        if classify_row(row).starts_block() {
            return true;
        }
        // 明示的なセクション切り替えなしにエラーテーブルが続く場合
        self == TableKind::Line && has_label(row, ERROR_MESSAGE)
    }
}

/// テーブル取り込みの結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestedTable {
    /// 有効なレコード
    pub records: Vec<JournalRecord>,

    /// 終端行（未消費）のインデックス、または入力の終端
    pub next_index: usize,

    /// 無効として捨てた行の数（合計行は含まない）
    pub dropped: usize,
}

/// ヘッダー行から列マップ（列インデックス → 列名）を構築
fn column_map(header: &[CellValue]) -> BTreeMap<usize, String> {
    header
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.is_absent())
        .map(|(idx, cell)| (idx, cell.as_text().trim().to_string()))
        .collect()
}

/// テーブルを取り込む
///
/// `header_index`の行をヘッダーとして列マップを構築し、次の行から
/// データ行を消費します。
///
/// - "Total for Journal Entry"を含む行はスキップ（終端しない、記録しない）
/// - `TxnHeader` / `SectionProcessed` / `SectionError` の行で終端
/// - 明細テーブルの場合は"Error Message"ラベルを含む行でも終端
/// - それ以外の行はレコード化し、有効なものだけを結果に追加
pub fn ingest_table(rows: &[Row], header_index: usize, kind: TableKind) -> IngestedTable {
    let columns = match rows.get(header_index) {
        Some(header) => column_map(header),
        None => {
            return IngestedTable {
                next_index: rows.len(),
                ..Default::default()
            }
        }
    };

    let mut table = IngestedTable::default();
    let mut index = header_index + 1;

    while index < rows.len() {
        let row = &rows[index];

        if is_total_row(row) {
            index += 1;
            continue;
        }
        if kind.terminates_at(row) {
            break;
        }

        let record: JournalRecord = columns
            .iter()
            .filter_map(|(&col_idx, name)| {
                row.get(col_idx).map(|value| (name.clone(), value.clone()))
            })
            .collect();

        if kind.is_valid(&record) {
            table.records.push(record);
        } else {
            table.dropped += 1;
        }
        index += 1;
    }

    table.next_index = index;
    table
}

/// 明細テーブルを取り込む
pub fn ingest_line_table(rows: &[Row], header_index: usize) -> IngestedTable {
    ingest_table(rows, header_index, TableKind::Line)
}

/// エラーテーブルを取り込む
pub fn ingest_error_table(rows: &[Row], header_index: usize) -> IngestedTable {
    ingest_table(rows, header_index, TableKind::Error)
}
