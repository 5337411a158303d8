//! Excel生成（CLI版）
//!
//! 共通ライブラリの SheetWriter をグループ単位で駆動し、
//! サムネイルは1枚ずつ非同期に読み込んでから書き込む。

use super::{ExportContext, SkippedThumbnail};
use crate::config::ThumbnailPolicy;
use crate::error::Result;
use crate::thumbnail::load_thumbnail;
use predict_sheet_common::export::excel_core::{SheetLayout, SheetWriter, Thumbnail};
use predict_sheet_common::layout::{block_rows_for, thumbnail_box};
use predict_sheet_common::{group_by_image, PredictionRecord, PredictionRow};
use rust_xlsxwriter::Worksheet;
use std::path::Path;
use tracing::{debug, warn};

/// 1シート分を生成
///
/// `records` は画像名でソート済みであること。
pub async fn build_sheet(
    name: &str,
    records: &[PredictionRecord],
    ctx: &ExportContext,
    skipped: &mut Vec<SkippedThumbnail>,
) -> Result<(Worksheet, SheetLayout)> {
    let mut writer = SheetWriter::new(name)?;

    for group in group_by_image(records) {
        let thumbnail = match group.representative().origin_path() {
            Some(path) => {
                let (_, max_height) = thumbnail_box(block_rows_for(group.len()));
                group_thumbnail(Path::new(path), group.image_name, max_height, ctx, skipped).await?
            }
            None => None,
        };

        debug!(
            sheet = name,
            image = group.image_name,
            row = writer.current_row(),
            records = group.len(),
            "グループ書き込み"
        );
        writer.write_group(&group, thumbnail.as_ref())?;
    }

    Ok(writer.finish())
}

async fn group_thumbnail(
    path: &Path,
    image_name: &str,
    max_height: u32,
    ctx: &ExportContext,
    skipped: &mut Vec<SkippedThumbnail>,
) -> Result<Option<Thumbnail>> {
    match load_thumbnail(path, image_name, ctx.thumbnail_width, max_height).await {
        Ok(thumbnail) => Ok(Some(thumbnail)),
        Err(e) if ctx.thumbnail_errors == ThumbnailPolicy::Skip => {
            warn!(image = image_name, error = %e, "サムネイルをスキップ");
            skipped.push(SkippedThumbnail {
                image_name: image_name.to_string(),
                reason: e.to_string(),
            });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
