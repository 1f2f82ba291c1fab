//! Transaction Buffer Module
//!
//! 1つの取引ブロックに属する明細行・エラー行を蓄積し、フラッシュ時に
//! コンテキストのマージとエラーの割り当てを行って出力コレクションへ渡す。

use tracing::{debug, warn};

use crate::classifier::{ERROR_MESSAGE, LINE, TRANSACTION_NUMBER};
use crate::context::TransactionContext;
use crate::types::{CellValue, JournalRecord, Section};

/// エラーセクションの明細に追加される列名
pub const ERROR_FIELD: &str = "Error";

/// 複数のエラーメッセージを結合する区切り文字
pub const ERROR_SEPARATOR: &str = " | ";

/// フラッシュによって確定した明細
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushedLines {
    pub processed: Vec<JournalRecord>,
    pub errored: Vec<JournalRecord>,

    /// `Section::Unknown`のため破棄された明細の数
    pub discarded: usize,
}

/// エラーメッセージを取得（不在の場合は`None`）
fn error_message(error: &JournalRecord) -> Option<String> {
    error
        .get(ERROR_MESSAGE)
        .filter(|v| !v.is_absent())
        .map(CellValue::as_text)
}

/// 明細行に割り当てるエラーメッセージを決定する
///
/// 1. 行番号（トリム済みテキスト）が一致するエラーがあれば、そのメッセージを結合
/// 2. 一致するエラーがなければ、取引内のすべてのエラーメッセージを結合
/// 3. エラーが1件もなければ空文字列
///
/// 2.の場合、同じメッセージが複数の明細に重複して割り当てられることがある。
fn attribute_errors(line: &JournalRecord, errors: &[JournalRecord]) -> String {
    if let Some(line_number) = line.text(LINE) {
        let matched: Vec<String> = errors
            .iter()
            .filter(|e| e.text(LINE).as_deref() == Some(line_number.as_str()))
            .filter_map(error_message)
            .collect();
        if !matched.is_empty() {
            return matched.join(ERROR_SEPARATOR);
        }
    }

    errors
        .iter()
        .filter_map(error_message)
        .collect::<Vec<_>>()
        .join(ERROR_SEPARATOR)
}

/// 取引ブロックをフラッシュする
///
/// 各明細にコンテキストをマージし（明細自身の列が優先）、エラーセクションでは
/// `Error`列を設定して、セクションに応じた出力へ振り分けます。
/// `Section::Unknown`の明細は破棄されます。
pub fn flush(
    section: Section,
    context: &TransactionContext,
    pending_lines: Vec<JournalRecord>,
    pending_errors: &[JournalRecord],
) -> FlushedLines {
    let mut flushed = FlushedLines::default();

    for mut line in pending_lines {
        context.merge_into(&mut line);

        match section {
            Section::Processed => flushed.processed.push(line),
            Section::Error => {
                let message = attribute_errors(&line, pending_errors);
                line.insert(ERROR_FIELD, CellValue::String(message));
                flushed.errored.push(line);
            }
            Section::Unknown => flushed.discarded += 1,
        }
    }

    flushed
}

/// 現在の取引ブロックの作業領域
#[derive(Debug, Clone, Default)]
pub struct TransactionBuffer {
    context: TransactionContext,
    pending_lines: Vec<JournalRecord>,
    pending_errors: Vec<JournalRecord>,
}

impl TransactionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_context(&mut self, context: TransactionContext) {
        self.context = context;
    }

    pub fn context(&self) -> &TransactionContext {
        &self.context
    }

    pub fn push_lines(&mut self, lines: impl IntoIterator<Item = JournalRecord>) {
        self.pending_lines.extend(lines);
    }

    pub fn push_errors(&mut self, errors: impl IntoIterator<Item = JournalRecord>) {
        self.pending_errors.extend(errors);
    }

    pub fn pending_lines(&self) -> &[JournalRecord] {
        &self.pending_lines
    }

    pub fn pending_errors(&self) -> &[JournalRecord] {
        &self.pending_errors
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.pending_lines.is_empty() && self.pending_errors.is_empty()
    }

    /// バッファをフラッシュし、コンテキストと保留中の明細・エラーをクリアする
    ///
    /// 空のバッファに対しては何もしません。
    pub fn flush(&mut self, section: Section) -> FlushedLines {
        if self.is_empty() {
            return FlushedLines::default();
        }

        let context = std::mem::take(&mut self.context);
        let lines = std::mem::take(&mut self.pending_lines);
        let errors = std::mem::take(&mut self.pending_errors);

        let transaction = context
            .get(TRANSACTION_NUMBER)
            .map(CellValue::as_text)
            .unwrap_or_else(|| "<none>".to_string());
        let flushed = flush(section, &context, lines, &errors);

        if flushed.discarded > 0 {
            warn!(
                "Discarded {} line(s) of transaction {} found before any section banner",
                flushed.discarded, transaction
            );
        }
        debug!(
            "Flushed transaction {} ({:?}): {} processed, {} errored, {} error row(s)",
            transaction,
            section,
            flushed.processed.len(),
            flushed.errored.len(),
            errors.len()
        );

        flushed
    }
}
