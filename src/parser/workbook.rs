//! Workbook Parser
//!
//! calamineのラッパーとして、シートの選択とセル値の変換を提供します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::{Cursor, Read};
use tracing::debug;

use crate::api::SheetSelector;
use crate::error::LedgerZeroError;
use crate::security::SecurityConfig;
use crate::types::{CellValue, Row};

/// ワークブックパーサー
///
/// 入力全体をメモリに読み込んでから開くため、`Seek`を実装しないリーダー
/// （アップロードされたデータのストリームなど）も受け付けます。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（xlsx / xlsm / xlsb / xls / ods）
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - 入力ファイルを読み込むためのリーダー
    /// * `security` - 入力サイズの制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(LedgerZeroError)` - 読み込みに失敗した場合、またはサイズ制限を超えた場合
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, LedgerZeroError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシート名を解決
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(LedgerZeroError::SheetNotFound)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn resolve_sheet(&self, selector: &SheetSelector) -> Result<String, LedgerZeroError> {
        let available = self.sheet_names();

        let found = match selector {
            SheetSelector::Name(name) => available.iter().find(|s| *s == name).cloned(),
            SheetSelector::Index(index) => available.get(*index).cloned(),
        };

        found.ok_or_else(|| LedgerZeroError::SheetNotFound {
            sheet: match selector {
                SheetSelector::Name(name) => name.clone(),
                SheetSelector::Index(index) => format!("#{}", index),
            },
            available,
        })
    }

    /// シートを行の並びとして読み込む
    ///
    /// ヘッダー行は想定せず、シートのすべての行をそのまま返します。
    /// 列インデックスはシートの列位置（A列 = 0）と一致します。
    pub fn read_rows(
        &mut self,
        sheet_name: &str,
        security: &SecurityConfig,
    ) -> Result<Vec<Row>, LedgerZeroError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        // 上端の余白行は制限の対象外
        security.check_row_count(range.height())?;
        let rows = range_to_rows(&range);

        debug!(
            "Read {} row(s) from sheet '{}' ({} used columns)",
            rows.len(),
            sheet_name,
            range.width()
        );
        Ok(rows)
    }
}

/// calamineのセル範囲を行の並びに変換
///
/// 使用範囲がA1から始まらない場合でも、先頭の空行・空列を補って
/// シート上の位置を保ちます。
fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Row> = Vec::with_capacity(row_offset + range.height());
    rows.extend(std::iter::repeat_with(Vec::new).take(row_offset));

    for row in range.rows() {
        let mut cells = Vec::with_capacity(col_offset + row.len());
        cells.extend(std::iter::repeat(CellValue::Empty).take(col_offset));
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    rows
}

/// calamineのセル値を変換
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if !dt.is_duration() => CellValue::DateTime(value),
            _ => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// ISO 8601形式の日時文字列を解析（ODSの日付セル）
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
