//! Row Classifier Module
//!
//! 1行のセル値だけを見て、その行の「形」を判定する純粋関数を提供する。
//! レポートには固定のスキーマがないため、ラベル文字列による判定を行う。

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::CellValue;

pub(crate) const TRANSACTION_NUMBER: &str = "Transaction Number";
pub(crate) const ACCOUNTING_CLASS: &str = "Accounting Class";
pub(crate) const ERROR_MESSAGE: &str = "Error Message";
pub(crate) const LINE: &str = "Line";
pub(crate) const TOTAL_FOR_JOURNAL_ENTRY: &str = "Total for Journal Entry";

/// 行の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// エラーセクションのバナー（例: "Journal Entries with Errors"）
    SectionError,

    /// 処理済みセクションのバナー（例: "Journal Entries Processed"）
    SectionProcessed,

    /// 取引コンテキストのヘッダー（"Transaction Number"ラベルを含む）
    TxnHeader,

    /// 明細テーブルのヘッダー（"Accounting Class"ラベルを含む）
    LineTableHeader,

    /// エラーテーブルのヘッダー（"Error Message"ラベルを含む）
    ErrorTableHeader,

    /// 上記以外（データ行、空行など）
    Other,
}

impl RowKind {
    /// 新しいトランザクションまたはセクションの開始を示す行か
    pub(crate) fn starts_block(self) -> bool {
        matches!(
            self,
            RowKind::TxnHeader | RowKind::SectionProcessed | RowKind::SectionError
        )
    }
}

lazy_static! {
    // セクションバナー: "Journal Entries with Errors" など
    static ref SECTION_ERROR_PATTERN: Regex =
        Regex::new(r"(?i)journal entr.*error").expect("valid regex");

    // セクションバナー: "Journal Entries Processed" など
    static ref SECTION_PROCESSED_PATTERN: Regex =
        Regex::new(r"(?i)journal entr.*processed").expect("valid regex");
}

/// 行を分類する
///
/// 判定は以下の優先順位で行い、最初に一致したものを返します。
///
/// 1. 結合テキストが "journal entr...error" に一致 → `SectionError`
/// 2. 結合テキストが "journal entr...processed" に一致 → `SectionProcessed`
/// 3. "Transaction Number" と等しいセルがある（大文字小文字を区別しない） → `TxnHeader`
/// 4. "Accounting Class" と等しいセルがある → `LineTableHeader`
/// 5. "Error Message" と等しいセルがある → `ErrorTableHeader`
/// 6. それ以外 → `Other`
pub fn classify_row(row: &[CellValue]) -> RowKind {
    let joined = row_text(row);

    if SECTION_ERROR_PATTERN.is_match(&joined) {
        RowKind::SectionError
    } else if SECTION_PROCESSED_PATTERN.is_match(&joined) {
        RowKind::SectionProcessed
    } else if has_label_ignore_case(row, TRANSACTION_NUMBER) {
        RowKind::TxnHeader
    } else if has_label(row, ACCOUNTING_CLASS) {
        RowKind::LineTableHeader
    } else if has_label(row, ERROR_MESSAGE) {
        RowKind::ErrorTableHeader
    } else {
        RowKind::Other
    }
}

/// 不在でないセルのテキストを空白1つで結合する
pub(crate) fn row_text(row: &[CellValue]) -> String {
    row.iter()
        .filter(|cell| !cell.is_absent())
        .map(CellValue::as_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// ラベルと完全一致するセルがあるか（前後の空白は無視）
pub(crate) fn has_label(row: &[CellValue], label: &str) -> bool {
    label_position(row, label).is_some()
}

/// ラベルと完全一致する最初のセルの列インデックス
pub(crate) fn label_position(row: &[CellValue], label: &str) -> Option<usize> {
    row.iter().position(|cell| match cell {
        CellValue::String(s) => s.trim() == label,
        _ => false,
    })
}

fn has_label_ignore_case(row: &[CellValue], label: &str) -> bool {
    row.iter().any(|cell| match cell {
        CellValue::String(s) => s.trim().eq_ignore_ascii_case(label),
        _ => false,
    })
}

/// 仕訳の合計行（"Total for Journal Entry"）か
pub(crate) fn is_total_row(row: &[CellValue]) -> bool {
    row_text(row).contains(TOTAL_FOR_JOURNAL_ENTRY)
}
