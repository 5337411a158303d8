pub mod excel;

use crate::config::{Config, ThumbnailPolicy};
use crate::error::{SheetError, Result};
use chrono::{Datelike, Timelike};
use predict_sheet_common::export::excel_core::SheetLayout;
use predict_sheet_common::grouper::check_groups;
use predict_sheet_common::layout::{category_sheet_name, unique_sheet_name, SINGLE_SHEET_NAME};
use predict_sheet_common::{
    group_by_image, parse_records, partition_by_category, sort_by_category, sort_by_image_name,
    validate_records, OverflowPolicy, PredictionRecord,
};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

/// エクスポート1回分の設定
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub output_dir: PathBuf,
    pub thumbnail_width: u32,
    pub overflow: OverflowPolicy,
    pub thumbnail_errors: ThumbnailPolicy,
}

impl ExportContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.resolve_output_dir(),
            thumbnail_width: config.thumbnail_width,
            overflow: config.overflow,
            thumbnail_errors: config.thumbnail_errors,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// 読み込めなかったサムネイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedThumbnail {
    pub image_name: String,
    pub reason: String,
}

/// エクスポート結果
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub sheets: Vec<SheetLayout>,
    pub skipped: Vec<SkippedThumbnail>,
}

impl ExportReport {
    pub fn data_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.data_rows).sum()
    }

    pub fn groups(&self) -> usize {
        self.sheets.iter().map(|s| s.blocks.len()).sum()
    }

    pub fn thumbnails_embedded(&self) -> usize {
        self.sheets
            .iter()
            .flat_map(|s| s.blocks.iter())
            .filter(|b| b.has_thumbnail)
            .count()
    }
}

/// 生成済みワークブック（未保存）
pub struct BuiltWorkbook {
    pub workbook: Workbook,
    pub sheets: Vec<SheetLayout>,
    pub skipped: Vec<SkippedThumbnail>,
}

/// シート割り当て
#[derive(Debug, Clone)]
pub struct SheetPlan {
    pub name: String,
    pub records: Vec<PredictionRecord>,
}

/// 出力ファイル名 `YYYY_M_D_H_m_s.xlsx`（ゼロ埋めなし）
pub fn timestamped_file_name<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}.xlsx",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// レコードをシートに割り当てる
///
/// - 単一シート: 画像名でソートし `表1` に出力
/// - 複数シート: カテゴリでソートし、カテゴリが変わるごとに新しいシート。
///   各シート内は画像名でソート
/// - 空入力: どちらのモードでもヘッダのみの `表1`
pub fn plan_sheets(mut records: Vec<PredictionRecord>, many_sheets: bool) -> Vec<SheetPlan> {
    if records.is_empty() || !many_sheets {
        sort_by_image_name(&mut records);
        return vec![SheetPlan {
            name: SINGLE_SHEET_NAME.to_string(),
            records,
        }];
    }

    sort_by_category(&mut records);

    let mut plans: Vec<SheetPlan> = Vec::new();
    let mut used: Vec<String> = Vec::new();
    for (category, run) in partition_by_category(&records) {
        let name = unique_sheet_name(&category_sheet_name(category), &used);
        used.push(name.clone());

        let mut run = run.to_vec();
        sort_by_image_name(&mut run);
        plans.push(SheetPlan { name, records: run });
    }
    plans
}

/// レイアウト開始前の検証
pub fn validate_plans(plans: &[SheetPlan], overflow: OverflowPolicy) -> Result<()> {
    for plan in plans {
        validate_records(&plan.records)?;
        check_groups(&group_by_image(&plan.records), overflow)?;
    }
    Ok(())
}

/// ワークブックを生成（保存はしない）
pub async fn build_workbook(
    records: Vec<PredictionRecord>,
    many_sheets: bool,
    ctx: &ExportContext,
) -> Result<BuiltWorkbook> {
    validate_records(&records)?;
    let plans = plan_sheets(records, many_sheets);
    validate_plans(&plans, ctx.overflow)?;

    let mut workbook = Workbook::new();
    let mut sheets = Vec::with_capacity(plans.len());
    let mut skipped = Vec::new();

    for plan in &plans {
        let (worksheet, layout) =
            excel::build_sheet(&plan.name, &plan.records, ctx, &mut skipped).await?;
        info!(sheet = %plan.name, rows = layout.data_rows, groups = layout.blocks.len(), "シート生成");
        workbook.push_worksheet(worksheet);
        sheets.push(layout);
    }

    Ok(BuiltWorkbook { workbook, sheets, skipped })
}

/// タイムスタンプ付きファイル名で保存
pub fn save_workbook(workbook: &mut Workbook, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|source| SheetError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(timestamped_file_name(&chrono::Local::now()));
    workbook
        .save(&path)
        .map_err(|source| SheetError::Serialization {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

/// レコードをExcelに出力
pub async fn export_records(
    records: Vec<PredictionRecord>,
    many_sheets: bool,
    ctx: &ExportContext,
) -> Result<ExportReport> {
    info!(records = records.len(), many_sheets, "エクスポート開始");

    let BuiltWorkbook { mut workbook, sheets, skipped } =
        build_workbook(records, many_sheets, ctx).await?;
    let path = save_workbook(&mut workbook, &ctx.output_dir)?;

    info!(path = %path.display(), sheets = sheets.len(), "エクスポート完了");
    Ok(ExportReport { path, sheets, skipped })
}

/// JSON配列文字列からExcelに出力
pub async fn export_json(json: &str, many_sheets: bool, ctx: &ExportContext) -> Result<ExportReport> {
    let records = parse_records(json)?;
    export_records(records, many_sheets, ctx).await
}
