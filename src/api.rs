//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 元レポートで取引データが置かれているシート名
pub const DEFAULT_SHEET_NAME: &str = "Sheet2";

/// 入力シートの選択方式
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet2".to_string())`（デフォルト）
    Name(String),

    /// インデックス指定（0始まり）
    Index(usize),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Name(DEFAULT_SHEET_NAME.to_string())
    }
}

/// 日付の出力形式
///
/// 日付セルをテキストとして出力する際（JSON/CSV）の形式を指定します。
/// XLSX出力では日付は日付型のまま書き込まれます。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD、時刻がある場合は YYYY-MM-DD HH:MM:SS）
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use ledgerzero::{DateFormat, ExtractorBuilder};
    ///
    /// # fn main() -> Result<(), ledgerzero::LedgerZeroError> {
    /// let extractor = ExtractorBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// XLSXワークブック（デフォルト）
    ///
    /// "Journal Entries Processed" と "Journal Entries Errored" の2シートを出力します。
    /// 列幅は内容に合わせて調整されます（上限あり）。
    Xlsx,

    /// JSON形式
    ///
    /// # 出力例
    ///
    /// ```json
    /// {
    ///   "Journal Entries Processed": [
    ///     {"Line": "1", "Accounting Class": "Revenue", "Transaction Number": "INV-1"}
    ///   ],
    ///   "Journal Entries Errored": [
    ///     {"Message": "No errored entries found"}
    ///   ]
    /// }
    /// ```
    Json,

    /// CSV形式
    ///
    /// 各テーブルは `# Sheet: <name>` 行に続けて出力されます。
    Csv,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}
