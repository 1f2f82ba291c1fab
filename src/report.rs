//! Report Parser Module
//!
//! 行の並びを前方に一度だけ走査し、行の分類結果に応じてコンテキスト抽出・
//! テーブル取り込み・フラッシュを振り分けるドライバー。
//!
//! 走査中の状態（現在のセクション、取引バッファ、出力コレクション）は
//! すべて`ParserState`が所有し、1回の呼び出しの外に残る状態はありません。

use tracing::{debug, info};

use crate::buffer::{FlushedLines, TransactionBuffer};
use crate::classifier::{classify_row, RowKind};
use crate::context::extract_context;
use crate::table::{ingest_error_table, ingest_line_table};
use crate::types::{JournalRecord, Row, Section};

/// 抽出処理の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// 処理済みセクションから出力された明細数
    pub processed_lines: usize,

    /// エラーセクションから出力された明細数
    pub errored_lines: usize,

    /// 検出した取引ヘッダーの数
    pub transactions: usize,

    /// 必須列が空のため捨てたテーブル行の数
    pub dropped_rows: usize,

    /// セクションバナーより前にあったため破棄した明細数
    pub discarded_lines: usize,

    /// 検出したセクションバナーの数
    pub sections_seen: usize,
}

/// 抽出結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalReport {
    processed: Vec<JournalRecord>,
    errored: Vec<JournalRecord>,
    summary: ExtractionSummary,
}

impl JournalReport {
    /// 正常に処理された明細（ProcessedLines）
    pub fn processed(&self) -> &[JournalRecord] {
        &self.processed
    }

    /// エラーになった明細（ErroredLines）
    pub fn errored(&self) -> &[JournalRecord] {
        &self.errored
    }

    pub fn summary(&self) -> ExtractionSummary {
        self.summary
    }

    /// 出力コレクションを取り出す
    pub fn into_parts(self) -> (Vec<JournalRecord>, Vec<JournalRecord>) {
        (self.processed, self.errored)
    }
}

/// 走査中の状態
#[derive(Debug, Default)]
struct ParserState {
    section: Section,
    buffer: TransactionBuffer,
    processed: Vec<JournalRecord>,
    errored: Vec<JournalRecord>,
    summary: ExtractionSummary,
}

impl ParserState {
    /// 現在の取引ブロックを確定させる
    fn flush(&mut self) {
        let FlushedLines {
            processed,
            errored,
            discarded,
        } = self.buffer.flush(self.section);

        self.processed.extend(processed);
        self.errored.extend(errored);
        self.summary.discarded_lines += discarded;
    }

    fn enter_section(&mut self, section: Section, row_number: usize) {
        self.flush();
        info!("Found section {:?} (row {})", section, row_number);
        self.section = section;
        self.summary.sections_seen += 1;
    }

    /// `cursor`の行を処理し、次に処理する行のインデックスを返す
    ///
    /// 戻り値は常に`cursor`より大きくなります。
    fn step(&mut self, rows: &[Row], cursor: usize) -> usize {
        match classify_row(&rows[cursor]) {
            RowKind::SectionError => {
                self.enter_section(Section::Error, cursor + 1);
                cursor + 1
            }
            RowKind::SectionProcessed => {
                self.enter_section(Section::Processed, cursor + 1);
                cursor + 1
            }
            RowKind::TxnHeader => {
                self.flush();
                let (context, next) = extract_context(rows, cursor);
                debug!(
                    "Transaction header at row {} with {} context key(s)",
                    cursor + 1,
                    context.len()
                );
                self.buffer.set_context(context);
                self.summary.transactions += 1;
                if next == cursor {
                    // ヘッダー行自体が明細テーブルのヘッダーを兼ねている
                    self.ingest_lines(rows, cursor)
                } else {
                    next
                }
            }
            RowKind::LineTableHeader => self.ingest_lines(rows, cursor),
            RowKind::ErrorTableHeader => {
                let table = ingest_error_table(rows, cursor);
                self.summary.dropped_rows += table.dropped;
                self.buffer.push_errors(table.records);
                table.next_index
            }
            RowKind::Other => cursor + 1,
        }
    }

    fn ingest_lines(&mut self, rows: &[Row], header_index: usize) -> usize {
        let table = ingest_line_table(rows, header_index);
        self.summary.dropped_rows += table.dropped;
        self.buffer.push_lines(table.records);
        table.next_index
    }

    fn finish(mut self) -> JournalReport {
        self.flush();
        self.summary.processed_lines = self.processed.len();
        self.summary.errored_lines = self.errored.len();
        JournalReport {
            processed: self.processed,
            errored: self.errored,
            summary: self.summary,
        }
    }
}

/// レポートの行を解析し、処理済み明細とエラー明細に振り分ける
///
/// 不正な行はエラーにせず読み飛ばします。同じ入力に対しては常に同じ結果を返します。
///
/// # 使用例
///
/// ```rust
/// use ledgerzero::{parse_report, CellValue};
///
/// let rows = vec![
///     vec![CellValue::from("Journal Entries Processed")],
///     vec![CellValue::from("Transaction Number"), CellValue::from("INV-1")],
///     vec![CellValue::from("Line"), CellValue::from("Accounting Class")],
///     vec![CellValue::from("1"), CellValue::from("Revenue")],
/// ];
///
/// let report = parse_report(&rows);
/// assert_eq!(report.processed().len(), 1);
/// assert!(report.errored().is_empty());
/// ```
pub fn parse_report(rows: &[Row]) -> JournalReport {
    let mut state = ParserState::default();
    let mut cursor = 0;

    while cursor < rows.len() {
        cursor = state.step(rows, cursor);
    }

    let report = state.finish();
    let summary = report.summary();
    info!(
        "Extraction complete. Processed lines: {}, error lines: {}, transactions: {}",
        summary.processed_lines, summary.errored_lines, summary.transactions
    );
    if summary.dropped_rows > 0 {
        debug!("Skipped {} table row(s) without required values", summary.dropped_rows);
    }
    report
}
