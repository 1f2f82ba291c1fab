//! Builder Module
//!
//! Fluent Builder APIを提供し、`Extractor`インスタンスを段階的に構築する。

use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::{DateFormat, OutputFormat, SheetSelector};
use crate::error::LedgerZeroError;
use crate::output::{assemble, OutputFormatter};
use crate::parser::WorkbookParser;
use crate::report::{parse_report, ExtractionSummary, JournalReport};
use crate::security::SecurityConfig;

/// 出力列幅の上限のデフォルト値（文字数）
pub const DEFAULT_MAX_COLUMN_WIDTH: f64 = 60.0;

/// 抽出処理の設定を保持する構造体
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// シート選択方式
    pub(crate) sheet_selector: SheetSelector,

    /// 出力フォーマット
    pub(crate) output_format: OutputFormat,

    /// 日付形式（JSON/CSV出力）
    pub(crate) date_format: DateFormat,

    /// XLSX出力の列幅の上限
    pub(crate) max_column_width: f64,

    /// 入力に対する制限
    pub(crate) security: SecurityConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::default(),
            output_format: OutputFormat::Xlsx,
            date_format: DateFormat::Iso8601,
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            security: SecurityConfig::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn sheet_selector(&self) -> &SheetSelector {
        &self.sheet_selector
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    pub fn max_column_width(&self) -> f64 {
        self.max_column_width
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Extractor`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use ledgerzero::{ExtractorBuilder, OutputFormat, SheetSelector};
///
/// # fn main() -> Result<(), ledgerzero::LedgerZeroError> {
/// let extractor = ExtractorBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(1))
///     .with_output_format(OutputFormat::Json)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExtractorBuilder {
    /// 内部設定（構築中）
    config: ExtractionConfig,
}

impl ExtractorBuilder {
    /// デフォルト設定でビルダーを作成
    ///
    /// # デフォルト値
    ///
    /// - シート選択: `SheetSelector::Name("Sheet2")`
    /// - 出力フォーマット: `OutputFormat::Xlsx`
    /// - 日付形式: `DateFormat::Iso8601`
    /// - 列幅の上限: 60
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力シートの選択方式を設定
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 出力フォーマットを設定
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// 日付形式を設定
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// XLSX出力の列幅の上限を設定
    pub fn with_max_column_width(mut self, width: f64) -> Self {
        self.config.max_column_width = width;
        self
    }

    /// 入力に対する制限を設定
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Extractor`インスタンスを構築
    ///
    /// # 発生し得るエラー
    ///
    /// * `LedgerZeroError::Config(String)`: 設定の検証に失敗した場合
    ///   * カスタム日付形式が不正な書式文字列
    ///   * 列幅の上限が正の有限値でない
    ///   * シート名が空文字列
    pub fn build(self) -> Result<Extractor, LedgerZeroError> {
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            crate::formatter::validate_date_format(format_str)?;
        }

        let width = self.config.max_column_width;
        if !width.is_finite() || width <= 0.0 {
            return Err(LedgerZeroError::Config(format!(
                "Invalid max column width: {} (must be a positive number)",
                width
            )));
        }

        if let SheetSelector::Name(ref name) = self.config.sheet_selector {
            if name.trim().is_empty() {
                return Err(LedgerZeroError::Config(
                    "Sheet name must not be empty".to_string(),
                ));
            }
        }

        self.config.security.validate()?;

        Ok(Extractor::new(self.config))
    }
}

/// 抽出処理のファサード
///
/// 「Create Accounting」レポートから処理済み・エラーの仕訳明細を抽出し、
/// 設定された出力フォーマットで書き出すメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use ledgerzero::ExtractorBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), ledgerzero::LedgerZeroError> {
/// let extractor = ExtractorBuilder::new().build()?;
/// let input = File::open("create_accounting.xlsx")?;
/// let output = File::create("Processed_create_accounting.xlsx")?;
/// let summary = extractor.convert(input, output)?;
/// println!("{} processed, {} errored", summary.processed_lines, summary.errored_lines);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub(crate) fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// 入力ワークブックを読み込み、明細を抽出
    ///
    /// # 引数
    ///
    /// * `input` - ワークブックを読み込むためのリーダー
    ///
    /// # 戻り値
    ///
    /// * `Ok(JournalReport)` - 抽出結果
    /// * `Err(LedgerZeroError)` - ワークブックまたはシートを読み込めない場合
    pub fn extract<R: Read>(&self, input: R) -> Result<JournalReport, LedgerZeroError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let sheet_name = parser.resolve_sheet(&self.config.sheet_selector)?;
        let rows = parser.read_rows(&sheet_name, &self.config.security)?;

        Ok(parse_report(&rows))
    }

    /// 抽出結果を設定された出力フォーマットで書き出す
    pub fn render<W: Write>(
        &self,
        report: JournalReport,
        mut output: W,
    ) -> Result<(), LedgerZeroError> {
        let (processed, errored) = report.into_parts();
        let tables = assemble(processed, errored);

        let formatter = OutputFormatter::from_format(self.config.output_format);
        formatter.render(&tables, &mut output, &self.config)
    }

    /// 抽出から書き出しまでを一度に行う
    ///
    /// # 戻り値
    ///
    /// * `Ok(ExtractionSummary)` - 抽出の集計
    /// * `Err(LedgerZeroError)` - エラーが発生した場合
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<ExtractionSummary, LedgerZeroError> {
        let report = self.extract(input)?;
        let summary = report.summary();
        self.render(report, output)?;
        Ok(summary)
    }

    /// ファイルからファイルへ変換
    ///
    /// 出力はメモリ上で完成させてから書き込むため、失敗時に中途半端な
    /// ファイルが残ることはありません。出力先が書き込み禁止（他のアプリケーションで
    /// 開かれているなど）の場合は`LedgerZeroError::PermissionDenied`を返します。
    pub fn convert_file(
        &self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ExtractionSummary, LedgerZeroError> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!("Reading input file: {}", input_path.display());
        let input = BufReader::new(File::open(input_path)?);

        let mut buffer = Vec::new();
        let summary = self.convert(input, &mut buffer)?;

        fs::write(output_path, &buffer).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => LedgerZeroError::PermissionDenied {
                path: output_path.to_path_buf(),
            },
            _ => LedgerZeroError::Io(e),
        })?;
        info!("Successfully saved to: {}", output_path.display());

        Ok(summary)
    }

    /// 複数のファイルを並列に変換
    ///
    /// 各ジョブは独立しており、1つの失敗が他のジョブに影響することはありません。
    /// 結果は`jobs`と同じ順序で返されます。
    pub fn convert_files(
        &self,
        jobs: &[(PathBuf, PathBuf)],
    ) -> Vec<Result<ExtractionSummary, LedgerZeroError>> {
        jobs.par_iter()
            .map(|(input, output)| self.convert_file(input, output))
            .collect()
    }
}
