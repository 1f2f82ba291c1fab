//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// セルの値を表す列挙型
///
/// シートから読み込んだ単一のセル値です。JSON出力時はタグなしで
/// シリアライズされ、`Empty`は`null`になります。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・日時
    DateTime(NaiveDateTime),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が「存在しない」とみなされるかどうかを判定
    ///
    /// 空セル、空白のみの文字列、`nan`/`None`というリテラル文字列、
    /// NaNの数値はすべて同じ「不在」として扱います。
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::String(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed == "None"
            }
            CellValue::Bool(_) | CellValue::DateTime(_) | CellValue::Error(_) => false,
        }
    }

    /// 値を正規化されたテキストとして取得
    ///
    /// 行の分類や行番号の照合に使用します。整数値の数値は小数点なしで
    /// 表現されるため、数値セル`1`と文字列セル`"1"`は同じテキストになります。
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 数値をテキスト化する（整数値は小数点なし）
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// 行（セルの順序付きシーケンス、0始まりの列インデックスでアクセス）
pub type Row = Vec<CellValue>;

/// レポート内のセクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// 最初のセクションバナーより前
    #[default]
    Unknown,

    /// 正常に処理された仕訳
    Processed,

    /// エラーになった仕訳
    Error,
}

/// 列名からセル値への順序付きマッピング
///
/// 仕訳明細（LineRecord）とエラー行（ErrorRecord）の両方に使用します。
/// 列の順序は最初に挿入された順序が保持されます。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JournalRecord {
    fields: IndexMap<String, CellValue>,
}

impl JournalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を設定する（既存の列は位置を保ったまま上書き）
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.fields.insert(column.into(), value);
    }

    /// 列が存在しない場合のみ値を設定する
    ///
    /// # 戻り値
    ///
    /// 値が設定された場合は`true`
    pub fn insert_if_missing(&mut self, column: &str, value: &CellValue) -> bool {
        if self.fields.contains_key(column) {
            return false;
        }
        self.fields.insert(column.to_string(), value.clone());
        true
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// 列に不在でない値があるかどうか
    pub fn has_value(&self, column: &str) -> bool {
        self.get(column).is_some_and(|v| !v.is_absent())
    }

    /// 不在でない値をトリム済みテキストとして取得
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|v| !v.is_absent())
            .map(|v| v.as_text().trim().to_string())
    }

    /// 列名を挿入順に返す
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for JournalRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = JournalRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
