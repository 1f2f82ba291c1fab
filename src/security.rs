//! Security Module
//!
//! 入力ファイルに対する制限を実装するモジュール。
//! 巨大なファイルや行数の多すぎるシートによるメモリ枯渇を防ぎます。

use crate::error::LedgerZeroError;

/// セキュリティ設定
///
/// ファイル処理時の制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
    /// 入力シートの最大行数
    /// デフォルト: 1,048,576（Excelの最大行数）
    pub max_rows: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
            max_rows: 1_048_576,
        }
    }
}

impl SecurityConfig {
    /// デフォルトのセキュリティ設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力ファイルサイズを検証
    pub(crate) fn check_input_size(&self, bytes: u64) -> Result<(), LedgerZeroError> {
        if bytes > self.max_input_file_size {
            return Err(LedgerZeroError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// シートの行数を検証
    pub(crate) fn check_row_count(&self, rows: usize) -> Result<(), LedgerZeroError> {
        if rows > self.max_rows {
            return Err(LedgerZeroError::SecurityViolation(format!(
                "Sheet row count exceeds maximum: {} rows (max: {} rows)",
                rows, self.max_rows
            )));
        }
        Ok(())
    }

    /// 設定値を検証
    pub(crate) fn validate(&self) -> Result<(), LedgerZeroError> {
        if self.max_input_file_size == 0 {
            return Err(LedgerZeroError::Config(
                "max_input_file_size must be greater than 0".to_string(),
            ));
        }
        if self.max_rows == 0 {
            return Err(LedgerZeroError::Config(
                "max_rows must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
