//! Formatter Module
//!
//! 出力時のセル値のテキスト化と、日付からExcelシリアル値への変換を提供するモジュール。

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::api::DateFormat;
use crate::error::LedgerZeroError;
use crate::types::{format_number, CellValue};

/// セルフォーマッター
///
/// セル値を出力用の文字列に変換するファサードです。
#[derive(Debug, Clone)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl CellFormatter {
    pub fn new(date_format: DateFormat) -> Self {
        Self {
            date_formatter: DateFormatter { date_format },
        }
    }

    /// セル値をフォーマット
    ///
    /// 不在の値は空文字列になります。
    pub fn format_cell(&self, value: &CellValue) -> String {
        if value.is_absent() {
            return String::new();
        }
        match value {
            CellValue::Number(n) => format_number(*n),
            CellValue::DateTime(dt) => self.date_formatter.format(dt),
            other => other.as_text(),
        }
    }
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new(DateFormat::Iso8601)
    }
}

/// 日付フォーマッター
#[derive(Debug, Clone)]
pub(crate) struct DateFormatter {
    date_format: DateFormat,
}

impl DateFormatter {
    /// 日時をフォーマット
    ///
    /// `DateFormat::Iso8601`の場合、時刻が0時ちょうどなら日付のみを出力します。
    pub fn format(&self, value: &NaiveDateTime) -> String {
        match &self.date_format {
            DateFormat::Iso8601 => {
                if value.time().num_seconds_from_midnight() == 0 {
                    value.format("%Y-%m-%d").to_string()
                } else {
                    value.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            DateFormat::Custom(format_str) => value.format(format_str).to_string(),
        }
    }
}

/// カスタム日付形式を検証する
///
/// chronoは不正な書式指定子を含む文字列のフォーマット時にパニックするため、
/// ビルド時に事前検証します。
pub(crate) fn validate_date_format(format_str: &str) -> Result<(), LedgerZeroError> {
    if format_str.trim().is_empty() {
        return Err(LedgerZeroError::Config(format!(
            "Invalid date format string: '{}'",
            format_str
        )));
    }
    if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
        return Err(LedgerZeroError::Config(format!(
            "Invalid date format string: '{}'",
            format_str
        )));
    }
    Ok(())
}

const MILLISECONDS_PER_DAY: f64 = 86_400_000.0;

/// Excel 1900年システムの起点（1899年12月30日）
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// 日時をExcelのシリアル値に変換する（1900年システム）
///
/// 1900年3月1日以降の日付について、Excelが表示する日付と一致します。
pub(crate) fn to_excel_serial(value: &NaiveDateTime) -> f64 {
    let elapsed = *value - excel_epoch();
    elapsed.num_milliseconds() as f64 / MILLISECONDS_PER_DAY
}

/// 時刻部分を持つかどうか
pub(crate) fn has_time(value: &NaiveDateTime) -> bool {
    value.time().num_seconds_from_midnight() != 0 || value.time().nanosecond() != 0
}
