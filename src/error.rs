//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;
use thiserror::Error;

/// ledgerzeroクレート全体で使用するエラー型
///
/// 入力シートの読み込み、出力ファイルの書き込み、設定の検証中に発生する
/// すべてのエラーを統一的に扱います。不正な行はエラーにならず、
/// 読み飛ばされる点に注意してください。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse` / `SheetNotFound`: 入力ワークブックを読み込めないエラー
/// - `PermissionDenied`: 出力先に書き込む権限がないエラー
/// - `Write` / `Csv` / `Json`: 出力のシリアライズに失敗したエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズなどの制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use ledgerzero::{ExtractorBuilder, LedgerZeroError};
///
/// let extractor = ExtractorBuilder::new().build().unwrap();
/// match extractor.convert_file("report.xlsx", "output.xlsx") {
///     Err(LedgerZeroError::PermissionDenied { path }) => {
///         eprintln!("close {} and try again", path.display());
///     }
///     Err(e) => eprintln!("{}", e),
///     Ok(_) => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum LedgerZeroError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力ワークブックの解析中に発生したエラー
    ///
    /// calamineがファイルを解析する際に発生したエラーです。ファイル形式が不正、
    /// 破損したファイル、サポートされていない形式などが原因となります。
    #[error("Failed to read input workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// 指定されたシートが存在しない
    #[error("Could not read sheet '{sheet}'. Available sheets: {}", .available.join(", "))]
    SheetNotFound {
        /// 要求されたシート
        sheet: String,
        /// ワークブック内のシート名
        available: Vec<String>,
    },

    /// 出力先への書き込み権限がない
    ///
    /// 出力ファイルが表計算ソフトで開かれている場合によく発生します。
    #[error(
        "Permission denied when writing to '{}'. Close the file if it is open and try again.",
        .path.display()
    )]
    PermissionDenied {
        /// 出力先のパス
        path: PathBuf,
    },

    /// 出力ワークブックの生成に失敗
    #[error("Failed to write output workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// CSV出力に失敗
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON出力に失敗
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ExtractorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust
    /// use ledgerzero::{ExtractorBuilder, LedgerZeroError};
    ///
    /// let result = ExtractorBuilder::new().with_max_column_width(0.0).build();
    /// assert!(matches!(result, Err(LedgerZeroError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl LedgerZeroError {
    /// 入力の読み込みに起因するエラーか
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LedgerZeroError::Parse(_)
                | LedgerZeroError::SheetNotFound { .. }
                | LedgerZeroError::SecurityViolation(_)
        )
    }

    /// 出力の書き込みに起因するエラーか
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            LedgerZeroError::PermissionDenied { .. }
                | LedgerZeroError::Write(_)
                | LedgerZeroError::Csv(_)
                | LedgerZeroError::Json(_)
        )
    }
}
