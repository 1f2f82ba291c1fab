//! Parser Module
//!
//! calamineを使用した入力ワークブックの読み込み。
//! レポートシートを、型付きセル値の行の並びに変換します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
