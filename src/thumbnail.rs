//! サムネイル生成モジュール
//!
//! 元画像を非同期に読み込み、指定の枠（縦横比維持）に収めて再エンコードする。

use crate::error::{SheetError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageResult};
use predict_sheet_common::export::excel_core::{ImageKind, Thumbnail};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// 画像バイト列からサムネイルを生成
///
/// `max_width` x `max_height` の枠に収まるよう縦横比を維持して拡縮する。
pub fn encode_thumbnail(
    bytes: &[u8],
    kind: ImageKind,
    max_width: u32,
    max_height: u32,
) -> ImageResult<Thumbnail> {
    let image = image::load_from_memory(bytes)?;
    let resized = image.resize(max_width.max(1), max_height.max(1), FilterType::Triangle);

    let mut data = Vec::new();
    match kind {
        // JPEGはアルファ非対応
        ImageKind::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8())
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)?,
        ImageKind::Png => resized.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?,
    }

    Ok(Thumbnail { data, kind })
}

/// 元画像を読み込んでサムネイルを生成
///
/// 読み込みは tokio::fs、デコード・縮小はブロッキングスレッドで行う。
pub async fn load_thumbnail(
    path: &Path,
    image_name: &str,
    max_width: u32,
    max_height: u32,
) -> Result<Thumbnail> {
    let image_load = |reason: String| SheetError::ImageLoad {
        path: path.display().to_string(),
        reason,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| image_load(e.to_string()))?;
    let kind = ImageKind::for_source(&path.to_string_lossy(), image_name);

    debug!(path = %path.display(), bytes = bytes.len(), kind = kind.extension(), "サムネイル生成");

    tokio::task::spawn_blocking(move || encode_thumbnail(&bytes, kind, max_width, max_height))
        .await
        .map_err(|e| image_load(e.to_string()))?
        .map_err(|e| image_load(e.to_string()))
}
